//! Status bar application: platform windowing, software rendering, tray and
//! lifecycle plumbing around the measurement logic in `slat-core`.

pub mod bar;
pub mod logging;
pub mod platform;
pub mod renderer;
pub mod signals;
pub mod tray;
pub mod workarea;

pub use bar::StatusBar;
pub use platform::{BarPlatform, BarWindowConfig, PlatformError};
pub use renderer::Renderer;
pub use tray::Tray;
pub use workarea::{WorkAreaOps, WorkAreaReservation};
