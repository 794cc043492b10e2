//! slat core library
//!
//! Platform-independent pieces of the status bar: metric sampling,
//! display-reading formatting, the fullscreen-cover predicate, the opacity
//! fade controller, and configuration. Everything that touches a window
//! system lives in the `slat-bar` crate.

pub mod config;
pub mod error;
pub mod fade;
pub mod geometry;
pub mod metrics;
pub mod reading;

// Re-export commonly used types
pub use config::BarConfig;
pub use error::ConfigError;
pub use fade::{FadeController, Tween, Visibility};
pub use geometry::ScreenRect;
pub use metrics::{IP_UNAVAILABLE, MetricSource, SystemSampler, first_non_loopback_ipv4};
pub use reading::DisplayReading;
