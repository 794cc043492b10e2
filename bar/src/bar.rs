//! The status bar itself: owns the platform window, the renderer, and the
//! four display fields, and turns refresh ticks into pixels.

use chrono::Local;
use tiny_skia::Color;
use tracing::debug;

use slat_core::{BarConfig, DisplayReading, MetricSource};

use crate::platform::{BarPlatform, BarWindowConfig, PlatformError};
use crate::renderer::{Renderer, colors};

/// Left/right padding between the screen edge and the outermost label
const EDGE_PADDING: f32 = 10.0;
/// Horizontal gap between neighboring labels
const LABEL_GAP: f32 = 16.0;

/// The four label strings currently on screen.
///
/// Overwritten wholesale on every refresh tick; the previous values are
/// never consulted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BarFields {
    pub cpu: String,
    pub ram: String,
    pub ip: String,
    pub clock: String,
}

impl BarFields {
    pub fn apply(&mut self, reading: DisplayReading) {
        self.cpu = reading.cpu;
        self.ram = reading.ram;
        self.ip = reading.ip;
        self.clock = reading.clock;
    }
}

/// Status bar over a platform backend.
///
/// Layout: CPU and RAM grow rightward from the left edge, the clock sits
/// flush against the right edge with the IP to its left.
pub struct StatusBar<P: BarPlatform> {
    platform: P,
    renderer: Renderer,
    fields: BarFields,
    font_size: f32,
    background: Color,
    text_color: Color,
    clock_format: String,
    dirty: bool,
}

impl<P: BarPlatform> StatusBar<P> {
    pub fn new(config: &BarConfig) -> Result<Self, PlatformError> {
        let platform = P::new(BarWindowConfig {
            height: config.bar_height,
            namespace: "slat".to_string(),
        })?;

        debug!(
            width = platform.width(),
            height = platform.height(),
            "status bar created"
        );

        Ok(Self {
            platform,
            renderer: Renderer::new(),
            fields: BarFields::default(),
            font_size: config.effective_font_size(),
            background: colors::from_rgba(config.background),
            text_color: colors::from_rgba(config.text_color),
            clock_format: config.clock_format.clone(),
            dirty: true,
        })
    }

    pub fn fields(&self) -> &BarFields {
        &self.fields
    }

    /// One refresh tick: query every metric once and overwrite all fields.
    pub fn refresh(&mut self, source: &mut dyn MetricSource) {
        let reading = DisplayReading::sample(source, Local::now(), &self.clock_format);
        self.fields.apply(reading);
        self.dirty = true;
    }

    /// Redraw into the platform buffer if a refresh happened since the last
    /// call, then commit. Commit itself no-ops when nothing changed.
    pub fn render(&mut self) {
        if self.dirty {
            self.draw();
            self.dirty = false;
        }
        self.platform.commit();
    }

    fn draw(&mut self) {
        let width = self.platform.width();
        let height = self.platform.height();
        let font_size = self.font_size;

        let (_, text_height) = self.renderer.measure_text(&self.fields.clock, font_size);
        let text_y = ((height as f32 - text_height) / 2.0).max(0.0);

        // Left side: CPU then RAM
        let (cpu_width, _) = self.renderer.measure_text(&self.fields.cpu, font_size);
        let ram_x = EDGE_PADDING + cpu_width + LABEL_GAP;

        // Right side: clock flush right, IP to its left
        let (clock_width, _) = self.renderer.measure_text(&self.fields.clock, font_size);
        let clock_x = width as f32 - EDGE_PADDING - clock_width;
        let (ip_width, _) = self.renderer.measure_text(&self.fields.ip, font_size);
        let ip_x = clock_x - LABEL_GAP - ip_width;

        let Some(buffer) = self.platform.pixel_buffer() else {
            return;
        };

        self.renderer.clear(buffer, width, height, self.background);

        for (text, x) in [
            (&self.fields.cpu, EDGE_PADDING),
            (&self.fields.ram, ram_x),
            (&self.fields.ip, ip_x),
            (&self.fields.clock, clock_x),
        ] {
            self.renderer
                .draw_text(buffer, width, height, text, x, text_y, font_size, self.text_color);
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.platform.set_opacity(opacity);
    }

    pub fn fullscreen_active(&mut self) -> bool {
        self.platform.fullscreen_active()
    }

    pub fn reserve_work_area(&mut self) -> Result<(), PlatformError> {
        self.platform.reserve_work_area()
    }

    pub fn restore_work_area(&mut self) -> Result<(), PlatformError> {
        self.platform.restore_work_area()
    }

    pub fn poll_events(&mut self) -> bool {
        self.platform.poll_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Counts how often each metric is queried.
    #[derive(Default)]
    struct CountingSource {
        cpu_calls: u32,
        ram_calls: u32,
        ip_calls: u32,
    }

    impl MetricSource for CountingSource {
        fn cpu_percent(&mut self) -> f32 {
            self.cpu_calls += 1;
            self.cpu_calls as f32
        }

        fn ram_percent(&mut self) -> f32 {
            self.ram_calls += 1;
            50.0
        }

        fn local_ip(&mut self) -> String {
            self.ip_calls += 1;
            "10.0.0.7".to_string()
        }
    }

    #[test]
    fn each_tick_queries_every_metric_exactly_once() {
        let mut source = CountingSource::default();
        let now = Local.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let mut fields = BarFields::default();

        for _ in 0..3 {
            fields.apply(DisplayReading::sample(&mut source, now, "%I:%M:%S %p"));
        }

        assert_eq!(source.cpu_calls, 3);
        assert_eq!(source.ram_calls, 3);
        assert_eq!(source.ip_calls, 3);
    }

    #[test]
    fn a_tick_overwrites_all_four_fields() {
        let mut source = CountingSource::default();
        let now = Local.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        let mut fields = BarFields {
            cpu: "stale".into(),
            ram: "stale".into(),
            ip: "stale".into(),
            clock: "stale".into(),
        };

        fields.apply(DisplayReading::sample(&mut source, now, "%I:%M:%S %p"));

        assert_eq!(fields.cpu, "CPU 1.0%");
        assert_eq!(fields.ram, "RAM 50.0%");
        assert_eq!(fields.ip, "10.0.0.7");
        assert_eq!(fields.clock, "09:00:00 AM");
    }
}
