//! Desktop work-area reservation.
//!
//! Reserving carves the bar's strip out of the desktop work area so
//! maximized windows stop underneath the bar instead of behind it. The
//! reservation must be undone on every exit path or the desktop keeps a
//! dead strip until the user logs out, so the guard restores on Drop as a
//! last resort behind the explicit restore calls.

use slat_core::ScreenRect;
use tracing::{debug, error};

use crate::platform::PlatformError;

/// Get/set access to the desktop work area.
///
/// Backends implement this over the native desktop call; tests use an
/// in-memory fake.
pub trait WorkAreaOps {
    fn work_area(&mut self) -> Result<ScreenRect, PlatformError>;
    fn set_work_area(&mut self, rect: ScreenRect) -> Result<(), PlatformError>;
}

/// Guard that owns the reserved strip.
///
/// `reserve` snapshots the current work area and applies the shrunken one;
/// `restore` writes the snapshot back bit-identically. Both are idempotent.
pub struct WorkAreaReservation<O: WorkAreaOps> {
    ops: O,
    saved: Option<ScreenRect>,
}

impl<O: WorkAreaOps> WorkAreaReservation<O> {
    pub fn new(ops: O) -> Self {
        Self { ops, saved: None }
    }

    pub fn is_reserved(&self) -> bool {
        self.saved.is_some()
    }

    /// Shrink the work area by a strip of `height` pixels at the top.
    /// No-op when a reservation is already in place.
    pub fn reserve(&mut self, height: u32) -> Result<(), PlatformError> {
        if self.saved.is_some() {
            return Ok(());
        }

        let original = self.ops.work_area()?;
        self.ops
            .set_work_area(original.without_top_strip(height as i32))?;
        self.saved = Some(original);
        debug!(?original, height, "work area reserved");
        Ok(())
    }

    /// Write the saved work area back. Safe to call repeatedly; on failure
    /// the snapshot is kept so a later attempt can retry.
    pub fn restore(&mut self) -> Result<(), PlatformError> {
        let Some(original) = self.saved else {
            return Ok(());
        };

        self.ops.set_work_area(original)?;
        self.saved = None;
        debug!(?original, "work area restored");
        Ok(())
    }
}

impl<O: WorkAreaOps> Drop for WorkAreaReservation<O> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("failed to restore work area on shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory desktop whose work area survives the guard being dropped.
    #[derive(Clone)]
    struct FakeDesktop {
        area: Rc<RefCell<ScreenRect>>,
    }

    impl FakeDesktop {
        fn new(area: ScreenRect) -> Self {
            Self {
                area: Rc::new(RefCell::new(area)),
            }
        }

        fn current(&self) -> ScreenRect {
            *self.area.borrow()
        }
    }

    impl WorkAreaOps for FakeDesktop {
        fn work_area(&mut self) -> Result<ScreenRect, PlatformError> {
            Ok(*self.area.borrow())
        }

        fn set_work_area(&mut self, rect: ScreenRect) -> Result<(), PlatformError> {
            *self.area.borrow_mut() = rect;
            Ok(())
        }
    }

    // Taskbar at the bottom: the desktop's work area is not the full screen
    const DESKTOP: ScreenRect = ScreenRect {
        left: 0,
        top: 0,
        right: 1920,
        bottom: 1040,
    };

    #[test]
    fn reserve_then_restore_round_trips_bit_identically() {
        let desktop = FakeDesktop::new(DESKTOP);
        let mut reservation = WorkAreaReservation::new(desktop.clone());

        reservation.reserve(30).unwrap();
        assert_eq!(desktop.current(), ScreenRect::new(0, 30, 1920, 1040));

        reservation.restore().unwrap();
        assert_eq!(desktop.current(), DESKTOP);
    }

    #[test]
    fn double_reserve_does_not_stack() {
        let desktop = FakeDesktop::new(DESKTOP);
        let mut reservation = WorkAreaReservation::new(desktop.clone());

        reservation.reserve(30).unwrap();
        reservation.reserve(30).unwrap();
        assert_eq!(desktop.current(), ScreenRect::new(0, 30, 1920, 1040));

        reservation.restore().unwrap();
        assert_eq!(desktop.current(), DESKTOP);
    }

    #[test]
    fn restore_without_reserve_is_a_noop() {
        let desktop = FakeDesktop::new(DESKTOP);
        let mut reservation = WorkAreaReservation::new(desktop.clone());

        reservation.restore().unwrap();
        assert_eq!(desktop.current(), DESKTOP);
    }

    #[test]
    fn drop_restores_the_original_area() {
        let desktop = FakeDesktop::new(DESKTOP);
        {
            let mut reservation = WorkAreaReservation::new(desktop.clone());
            reservation.reserve(30).unwrap();
            assert_eq!(desktop.current(), ScreenRect::new(0, 30, 1920, 1040));
        }
        assert_eq!(desktop.current(), DESKTOP);
    }
}
