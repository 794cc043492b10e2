//! Bar configuration, stored as TOML via confy.
//!
//! Every field has a default matching the stock bar, so a missing or
//! partially filled config file always produces a working setup. There is
//! deliberately no CLI surface; the config file is the only knob.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Bar strip height in pixels; also the height of the reserved
    /// work-area strip.
    pub bar_height: u32,
    /// Label refresh period in milliseconds.
    pub refresh_interval_ms: u64,
    /// Fullscreen watcher period in milliseconds.
    pub fullscreen_poll_ms: u64,
    /// Fade duration in milliseconds.
    pub fade_duration_ms: u64,
    /// Label font size; 0 derives it from the bar height.
    pub font_size: f32,
    /// Bar background color [R, G, B, A].
    pub background: [u8; 4],
    /// Label text color [R, G, B, A].
    pub text_color: [u8; 4],
    /// chrono format string for the clock label.
    pub clock_format: String,
    /// Tray icon PNG path, relative to the working directory.
    pub tray_icon_path: String,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            bar_height: 30,
            refresh_interval_ms: 1000,
            fullscreen_poll_ms: 1000,
            fade_duration_ms: 500,
            font_size: 0.0,
            background: [40, 44, 52, 255],
            text_color: [187, 194, 207, 255],
            clock_format: "%I:%M:%S %p".to_string(),
            tray_icon_path: "assets/slat.png".to_string(),
        }
    }
}

impl BarConfig {
    /// Load from the platform config dir, falling back to defaults when the
    /// file is unreadable. A missing file is created with the defaults.
    pub fn load() -> Self {
        match confy::load("slat", "config") {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store("slat", "config", self).map_err(ConfigError::Save)
    }

    /// Font size to render with; derived from the bar height unless
    /// explicitly overridden.
    pub fn effective_font_size(&self) -> f32 {
        if self.font_size > 0.0 {
            self.font_size
        } else {
            self.bar_height as f32 / 3.0
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn fullscreen_poll(&self) -> Duration {
        Duration::from_millis(self.fullscreen_poll_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_bar() {
        let config = BarConfig::default();
        assert_eq!(config.bar_height, 30);
        assert_eq!(config.refresh_interval(), Duration::from_millis(1000));
        assert_eq!(config.fullscreen_poll(), Duration::from_millis(1000));
        assert_eq!(config.fade_duration(), Duration::from_millis(500));
    }

    #[test]
    fn font_size_derives_from_bar_height_unless_overridden() {
        let mut config = BarConfig::default();
        assert_eq!(config.effective_font_size(), 10.0);

        config.font_size = 14.0;
        assert_eq!(config.effective_font_size(), 14.0);
    }
}
