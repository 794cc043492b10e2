//! System metric queries backed by sysinfo.
//!
//! Three independent queries feed the bar: global CPU utilization, physical
//! RAM utilization, and the machine's first non-loopback IPv4 address. Each
//! is re-run from scratch on every refresh tick; nothing is cached between
//! ticks beyond the OS handles sysinfo keeps internally.

use std::net::{IpAddr, Ipv4Addr};

use sysinfo::{Networks, System};

/// Sentinel shown in the IP label when no usable address exists.
pub const IP_UNAVAILABLE: &str = "IP not available";

/// Seam between the refresh loop and the OS accounting calls.
///
/// The refresh step invokes each method exactly once per tick; tests swap in
/// a counting fake to verify that.
pub trait MetricSource {
    /// Global CPU utilization as a percentage (all cores averaged).
    fn cpu_percent(&mut self) -> f32;

    /// Used physical memory as a percentage of total.
    fn ram_percent(&mut self) -> f32;

    /// First non-loopback IPv4 address, or [`IP_UNAVAILABLE`].
    fn local_ip(&mut self) -> String;
}

/// The real sampler over host accounting.
///
/// CPU usage is delta-based, so the constructor takes an initial refresh to
/// establish the baseline; the first tick after startup reports against it.
pub struct SystemSampler {
    system: System,
    networks: Networks,
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();

        Self {
            system,
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SystemSampler {
    fn cpu_percent(&mut self) -> f32 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage()
    }

    fn ram_percent(&mut self) -> f32 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f32 / total as f32 * 100.0
    }

    fn local_ip(&mut self) -> String {
        // Re-enumerate so interfaces that appeared since startup are seen
        self.networks.refresh_list();

        let addrs = self
            .networks
            .iter()
            .flat_map(|(_name, data)| data.ip_networks().iter().map(|net| net.addr));

        match first_non_loopback_ipv4(addrs) {
            Some(ip) => ip.to_string(),
            None => IP_UNAVAILABLE.to_string(),
        }
    }
}

/// First non-loopback IPv4 address in enumeration order.
///
/// First match wins; there is no tie-break beyond the order the iterator
/// yields addresses in. IPv6 addresses are skipped entirely.
pub fn first_non_loopback_ipv4<I>(addrs: I) -> Option<Ipv4Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn loopback_only_yields_none() {
        let addrs = vec![v4(127, 0, 0, 1), v4(127, 0, 1, 1)];
        assert_eq!(first_non_loopback_ipv4(addrs), None);
    }

    #[test]
    fn empty_set_yields_none() {
        assert_eq!(first_non_loopback_ipv4(std::iter::empty()), None);
    }

    #[test]
    fn first_non_loopback_wins_in_enumeration_order() {
        let addrs = vec![
            v4(127, 0, 0, 1),
            v4(192, 168, 1, 42),
            v4(10, 0, 0, 7),
        ];
        assert_eq!(
            first_non_loopback_ipv4(addrs),
            Some(Ipv4Addr::new(192, 168, 1, 42))
        );
    }

    #[test]
    fn ipv6_is_skipped() {
        let addrs = vec![
            IpAddr::V6("fe80::1".parse().unwrap()),
            v4(10, 0, 0, 7),
        ];
        assert_eq!(first_non_loopback_ipv4(addrs), Some(Ipv4Addr::new(10, 0, 0, 7)));
    }
}
