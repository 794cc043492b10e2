//! X11 platform implementation for the bar window
//!
//! Uses XCB via x11rb: an override-redirect ARGB dock window pinned to the
//! top edge of the screen. The work-area strip is claimed through
//! `_NET_WM_STRUT`/`_NET_WM_STRUT_PARTIAL`, the fade through
//! `_NET_WM_WINDOW_OPACITY` (needs a compositor), and the fullscreen check
//! through `_NET_ACTIVE_WINDOW`.

use tracing::debug;
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use slat_core::ScreenRect;

use super::{BarPlatform, BarWindowConfig, PlatformError};

// Atoms needed for EWMH hints
atom_manager! {
    pub AtomCollection: AtomCollectionCookie {
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_STATE,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_SKIP_TASKBAR,
        _NET_WM_STATE_SKIP_PAGER,
        _NET_WM_STRUT,
        _NET_WM_STRUT_PARTIAL,
        _NET_WM_WINDOW_OPACITY,
        _NET_ACTIVE_WINDOW,
        ATOM,
        CARDINAL,
        WINDOW,
    }
}

pub struct X11Bar {
    conn: RustConnection,
    window: Window,
    gc: Gcontext,
    root: Window,
    atoms: AtomCollection,
    width: u32,
    height: u32,
    screen_width: u32,
    screen_height: u32,
    depth: u8,

    pixel_data: Vec<u8>, // RGBA from renderer
    bgra_buffer: Vec<u8>,
    content_dirty: bool,

    opacity: f32,
    opacity_card: u32, // last value written to _NET_WM_WINDOW_OPACITY
    strut_reserved: bool,
    running: bool,
}

impl X11Bar {
    /// Find a 32-bit ARGB visual for transparency
    fn find_argb_visual(screen: &Screen) -> Option<(Visualid, u8)> {
        for depth in &screen.allowed_depths {
            if depth.depth == 32 {
                for visual in &depth.visuals {
                    if visual.class == VisualClass::TRUE_COLOR {
                        return Some((visual.visual_id, depth.depth));
                    }
                }
            }
        }
        None
    }

    /// Set EWMH hints: dock window, above everything, off the taskbar
    fn setup_window_hints(&self) -> Result<(), PlatformError> {
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_WINDOW_TYPE,
                self.atoms.ATOM,
                &[self.atoms._NET_WM_WINDOW_TYPE_DOCK],
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_STATE,
                self.atoms.ATOM,
                &[
                    self.atoms._NET_WM_STATE_ABOVE,
                    self.atoms._NET_WM_STATE_SKIP_TASKBAR,
                    self.atoms._NET_WM_STATE_SKIP_PAGER,
                ],
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        Ok(())
    }
}

impl BarPlatform for X11Bar {
    fn new(config: BarWindowConfig) -> Result<Self, PlatformError> {
        let (conn, screen_num) =
            x11rb::connect(None).map_err(|e| PlatformError::ConnectionFailed(e.to_string()))?;

        // Intern atoms
        let atoms = AtomCollection::new(&conn)
            .map_err(|e| PlatformError::Other(e.to_string()))?
            .reply()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let setup = conn.setup();
        let screen = &setup.roots[screen_num];
        let root = screen.root;
        let screen_width = screen.width_in_pixels as u32;
        let screen_height = screen.height_in_pixels as u32;

        // Find 32-bit visual for transparency
        let (visual, depth) = Self::find_argb_visual(screen)
            .ok_or_else(|| PlatformError::UnsupportedFeature("32-bit ARGB visual".into()))?;

        // Create colormap for 32-bit visual
        let colormap = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, root, visual)
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        // Create the strip window along the top edge
        let window = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let win_aux = CreateWindowAux::new()
            .background_pixel(0)
            .border_pixel(0)
            .colormap(colormap)
            .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY)
            .override_redirect(1);

        conn.create_window(
            depth,
            window,
            root,
            0,
            0,
            screen_width as u16,
            config.height as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &win_aux,
        )
        .map_err(|e| PlatformError::Other(e.to_string()))?;

        // Create graphics context
        let gc = conn
            .generate_id()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        conn.create_gc(gc, window, &CreateGCAux::new())
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        let size = (screen_width * config.height * 4) as usize;
        let bar = Self {
            conn,
            window,
            gc,
            root,
            atoms,
            width: screen_width,
            height: config.height,
            screen_width,
            screen_height,
            depth,
            pixel_data: vec![0u8; size],
            bgra_buffer: vec![0u8; size],
            content_dirty: true, // Initial render needed
            opacity: 1.0,
            opacity_card: u32::MAX,
            strut_reserved: false,
            running: true,
        };

        bar.setup_window_hints()?;

        // Fully opaque until a fade says otherwise
        bar.conn
            .change_property32(
                PropMode::REPLACE,
                bar.window,
                bar.atoms._NET_WM_WINDOW_OPACITY,
                bar.atoms.CARDINAL,
                &[bar.opacity_card],
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        bar.conn
            .map_window(window)
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        bar.conn
            .flush()
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        debug!(window, width = bar.width, height = bar.height, "bar window created");
        Ok(bar)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        self.opacity = opacity;
        let card = (opacity as f64 * u32::MAX as f64) as u32;
        if card == self.opacity_card {
            return;
        }
        self.opacity_card = card;

        let _ = self.conn.change_property32(
            PropMode::REPLACE,
            self.window,
            self.atoms._NET_WM_WINDOW_OPACITY,
            self.atoms.CARDINAL,
            &[card],
        );
        let _ = self.conn.flush();
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn foreground_window_rect(&mut self) -> Option<ScreenRect> {
        let reply = self
            .conn
            .get_property(
                false,
                self.root,
                self.atoms._NET_ACTIVE_WINDOW,
                self.atoms.WINDOW,
                0,
                1,
            )
            .ok()?
            .reply()
            .ok()?;
        let active = reply.value32()?.next()?;
        if active == 0 || active == self.window {
            return None;
        }

        let geom = self.conn.get_geometry(active).ok()?.reply().ok()?;
        // Geometry is relative to the parent; translate to root coordinates
        let pos = self
            .conn
            .translate_coordinates(active, self.root, 0, 0)
            .ok()?
            .reply()
            .ok()?;

        let left = pos.dst_x as i32;
        let top = pos.dst_y as i32;
        Some(ScreenRect::new(
            left,
            top,
            left + geom.width as i32,
            top + geom.height as i32,
        ))
    }

    fn reserve_work_area(&mut self) -> Result<(), PlatformError> {
        if self.strut_reserved {
            return Ok(());
        }

        // left, right, top, bottom
        let strut = [0, 0, self.height, 0];
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_STRUT,
                self.atoms.CARDINAL,
                &strut,
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        // ... plus start/end extents for each edge; only the top is claimed
        let strut_partial = [
            0,
            0,
            self.height,
            0,
            0,
            0,
            0,
            0,
            0,
            self.screen_width.saturating_sub(1),
            0,
            0,
        ];
        self.conn
            .change_property32(
                PropMode::REPLACE,
                self.window,
                self.atoms._NET_WM_STRUT_PARTIAL,
                self.atoms.CARDINAL,
                &strut_partial,
            )
            .map_err(|e| PlatformError::Other(e.to_string()))?;

        self.conn
            .flush()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        self.strut_reserved = true;
        debug!(height = self.height, "strut reserved");
        Ok(())
    }

    fn restore_work_area(&mut self) -> Result<(), PlatformError> {
        if !self.strut_reserved {
            return Ok(());
        }

        self.conn
            .delete_property(self.window, self.atoms._NET_WM_STRUT)
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        self.conn
            .delete_property(self.window, self.atoms._NET_WM_STRUT_PARTIAL)
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        self.conn
            .flush()
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        self.strut_reserved = false;
        debug!("strut released");
        Ok(())
    }

    fn pixel_buffer(&mut self) -> Option<&mut [u8]> {
        self.content_dirty = true; // Assume caller will modify the buffer
        Some(&mut self.pixel_data)
    }

    fn commit(&mut self) {
        // Skip the pixel push if nothing was drawn since the last commit
        if !self.content_dirty {
            return;
        }
        self.content_dirty = false;

        // Convert RGBA to BGRA into the staging buffer
        for (i, chunk) in self.pixel_data.chunks(4).enumerate() {
            let offset = i * 4;
            if chunk.len() == 4 && offset + 3 < self.bgra_buffer.len() {
                self.bgra_buffer[offset] = chunk[2]; // B
                self.bgra_buffer[offset + 1] = chunk[1]; // G
                self.bgra_buffer[offset + 2] = chunk[0]; // R
                self.bgra_buffer[offset + 3] = chunk[3]; // A
            }
        }

        let _ = self.conn.put_image(
            ImageFormat::Z_PIXMAP,
            self.window,
            self.gc,
            self.width as u16,
            self.height as u16,
            0,
            0,
            0,
            self.depth,
            &self.bgra_buffer,
        );
        let _ = self.conn.flush();
    }

    fn poll_events(&mut self) -> bool {
        while let Ok(Some(event)) = self.conn.poll_for_event() {
            match event {
                x11rb::protocol::Event::Expose(_) => {
                    self.content_dirty = true;
                }
                x11rb::protocol::Event::DestroyNotify(e) if e.window == self.window => {
                    self.running = false;
                    return false;
                }
                _ => {}
            }
        }
        self.running
    }
}

impl Drop for X11Bar {
    fn drop(&mut self) {
        // The server drops the struts with the window, which releases the
        // reserved strip even if restore was never called
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.flush();
    }
}
