//! Platform abstraction for the bar window
//!
//! This module defines the trait that both platform backends implement,
//! keeping the rendering and refresh code platform-agnostic. The bar is a
//! borderless always-on-top strip spanning the full width of the primary
//! screen; the backend owns the native window, its pixel buffer, and the
//! OS-level queries the watcher needs (foreground window, screen size,
//! work area).

use slat_core::ScreenRect;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

/// Configuration for creating the bar window
#[derive(Debug, Clone)]
pub struct BarWindowConfig {
    /// Strip height in pixels; the width always matches the screen
    pub height: u32,
    /// Window title / class identifier
    pub namespace: String,
}

impl Default for BarWindowConfig {
    fn default() -> Self {
        Self {
            height: 30,
            namespace: "slat".to_string(),
        }
    }
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// Buffer/memory allocation failed
    BufferError(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that both platform backends implement
pub trait BarPlatform: Sized {
    /// Create the bar window pinned to the top edge of the primary screen
    fn new(config: BarWindowConfig) -> Result<Self, PlatformError>;

    /// Current width of the bar (the screen width at creation time)
    fn width(&self) -> u32;

    /// Current height of the bar
    fn height(&self) -> u32;

    /// Full size of the primary screen in pixels
    fn screen_size(&self) -> (u32, u32);

    /// Apply a whole-window opacity in `0.0..=1.0`
    fn set_opacity(&mut self, opacity: f32);

    /// The last opacity applied via [`set_opacity`](Self::set_opacity)
    fn opacity(&self) -> f32;

    /// Bounding rectangle of the currently focused top-level window.
    /// Returns None when no window has focus (or the query fails).
    fn foreground_window_rect(&mut self) -> Option<ScreenRect>;

    /// Shrink the desktop work area by the bar's strip.
    /// A second call while already reserved is a no-op.
    fn reserve_work_area(&mut self) -> Result<(), PlatformError>;

    /// Give the reserved strip back to the desktop.
    /// Safe to call when nothing is reserved.
    fn restore_work_area(&mut self) -> Result<(), PlatformError>;

    /// Get mutable access to the pixel buffer (RGBA format)
    fn pixel_buffer(&mut self) -> Option<&mut [u8]>;

    /// Commit the current pixel buffer to the screen
    fn commit(&mut self);

    /// Process pending platform events (non-blocking)
    /// Returns false if the bar should close
    fn poll_events(&mut self) -> bool;

    /// Whether the focused window exactly covers the primary screen.
    ///
    /// Maximized-with-border windows overhang the screen edges and so do
    /// not count; neither does an empty desktop with no focused window.
    fn fullscreen_active(&mut self) -> bool {
        let (screen_w, screen_h) = self.screen_size();
        match self.foreground_window_rect() {
            Some(rect) => rect.covers_screen(screen_w as i32, screen_h as i32),
            None => false,
        }
    }
}

/// Re-export the appropriate platform for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Bar as NativeBar;

#[cfg(target_os = "windows")]
pub use windows::WindowsBar as NativeBar;
