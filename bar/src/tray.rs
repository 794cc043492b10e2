//! System tray icon with a single Exit action.
//!
//! The tray is the only way to end the application deliberately; the bar
//! window itself ignores close requests. On Linux the tray needs GTK, so it
//! sits behind the `linux-tray` feature and degrades to a stub without it.

#[cfg(any(target_os = "windows", feature = "linux-tray"))]
mod imp {
    use std::path::Path;

    use tracing::{debug, warn};
    use tray_icon::{
        Icon, TrayIcon, TrayIconBuilder,
        menu::{Menu, MenuEvent, MenuId, MenuItem},
    };

    use slat_core::BarConfig;

    use crate::platform::PlatformError;

    const FALLBACK_ICON_SIZE: u32 = 32;

    pub struct Tray {
        // Dropping the handle removes the icon from the tray
        _icon: TrayIcon,
        exit_id: MenuId,
    }

    impl Tray {
        pub fn new(config: &BarConfig) -> Result<Self, PlatformError> {
            let menu = Menu::new();
            let exit_item = MenuItem::new("Exit", true, None);
            menu.append(&exit_item)
                .map_err(|e| PlatformError::Other(format!("menu append failed: {}", e)))?;
            let exit_id = exit_item.id().clone();

            let icon = match load_png_icon(Path::new(&config.tray_icon_path)) {
                Some((rgba, width, height)) => Icon::from_rgba(rgba, width, height),
                None => {
                    debug!(
                        path = %config.tray_icon_path,
                        "tray icon not found, using generated fallback"
                    );
                    Icon::from_rgba(
                        fallback_icon_rgba(config.background, config.text_color),
                        FALLBACK_ICON_SIZE,
                        FALLBACK_ICON_SIZE,
                    )
                }
            }
            .map_err(|e| PlatformError::Other(format!("tray icon decode failed: {}", e)))?;

            let tray_icon = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip("slat is running")
                .with_icon(icon)
                .build()
                .map_err(|e| PlatformError::Other(format!("tray creation failed: {}", e)))?;

            Ok(Self {
                _icon: tray_icon,
                exit_id,
            })
        }

        /// Drain pending menu events; true once Exit was clicked.
        pub fn exit_requested(&self) -> bool {
            let mut exit = false;
            while let Ok(event) = MenuEvent::receiver().try_recv() {
                if event.id == self.exit_id {
                    exit = true;
                } else {
                    warn!(id = ?event.id, "unexpected tray menu event");
                }
            }
            exit
        }
    }

    /// Decode a PNG file to RGBA pixels
    fn load_png_icon(path: &Path) -> Option<(Vec<u8>, u32, u32)> {
        let data = std::fs::read(path).ok()?;
        let decoder = png::Decoder::new(data.as_slice());
        let mut reader = decoder.read_info().ok()?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).ok()?;

        let width = info.width;
        let height = info.height;

        // Convert to RGBA if needed
        let rgba = match info.color_type {
            png::ColorType::Rgba => buf[..info.buffer_size()].to_vec(),
            png::ColorType::Rgb => {
                let rgb = &buf[..info.buffer_size()];
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for chunk in rgb.chunks(3) {
                    rgba.extend_from_slice(chunk);
                    rgba.push(255);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let ga = &buf[..info.buffer_size()];
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for chunk in ga.chunks(2) {
                    let gray = chunk[0];
                    rgba.extend_from_slice(&[gray, gray, gray, chunk[1]]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let gray = &buf[..info.buffer_size()];
                let mut rgba = Vec::with_capacity((width * height * 4) as usize);
                for &g in gray {
                    rgba.extend_from_slice(&[g, g, g, 255]);
                }
                rgba
            }
            png::ColorType::Indexed => return None,
        };

        Some((rgba, width, height))
    }

    /// A bar-colored square with a light strip along its top edge.
    fn fallback_icon_rgba(background: [u8; 4], strip: [u8; 4]) -> Vec<u8> {
        let size = FALLBACK_ICON_SIZE;
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            let color = if y < size / 4 { strip } else { background };
            for _ in 0..size {
                rgba.extend_from_slice(&color);
            }
        }
        rgba
    }
}

#[cfg(not(any(target_os = "windows", feature = "linux-tray")))]
mod imp {
    use tracing::info;

    use slat_core::BarConfig;

    use crate::platform::PlatformError;

    /// No-op tray for builds without tray support. Exit comes from signals.
    pub struct Tray;

    impl Tray {
        pub fn new(_config: &BarConfig) -> Result<Self, PlatformError> {
            info!("built without tray support, exit via SIGINT/SIGTERM");
            Ok(Self)
        }

        pub fn exit_requested(&self) -> bool {
            false
        }
    }
}

pub use imp::Tray;
