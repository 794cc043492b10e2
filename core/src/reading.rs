//! Ephemeral per-tick display strings.

use chrono::{DateTime, Local};

use crate::metrics::MetricSource;

/// One refresh tick's worth of label text.
///
/// Recomputed from OS queries every tick and discarded after the bar copies
/// it into its display fields. No identity, nothing persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayReading {
    pub cpu: String,
    pub ram: String,
    pub ip: String,
    pub clock: String,
}

impl DisplayReading {
    /// Query all four values. Each metric is queried exactly once.
    pub fn sample(
        source: &mut dyn MetricSource,
        now: DateTime<Local>,
        clock_format: &str,
    ) -> Self {
        Self {
            cpu: format!("CPU {:.1}%", source.cpu_percent()),
            ram: format!("RAM {:.1}%", source.ram_percent()),
            ip: source.local_ip(),
            clock: now.format(clock_format).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedSource {
        cpu: f32,
        ram: f32,
        ip: &'static str,
    }

    impl MetricSource for FixedSource {
        fn cpu_percent(&mut self) -> f32 {
            self.cpu
        }
        fn ram_percent(&mut self) -> f32 {
            self.ram
        }
        fn local_ip(&mut self) -> String {
            self.ip.to_string()
        }
    }

    #[test]
    fn labels_are_formatted_like_the_bar_shows_them() {
        let mut source = FixedSource {
            cpu: 7.5,
            ram: 42.0,
            ip: "192.168.1.42",
        };
        let now = Local.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();

        let reading = DisplayReading::sample(&mut source, now, "%I:%M:%S %p");

        assert_eq!(reading.cpu, "CPU 7.5%");
        assert_eq!(reading.ram, "RAM 42.0%");
        assert_eq!(reading.ip, "192.168.1.42");
        assert_eq!(reading.clock, "03:09:26 PM");
    }
}
