// Host network identity via sysinfo

use std::net::{IpAddr, Ipv4Addr};
use sysinfo::Networks;
use tracing::instrument;

/// Bridge/veth interfaces Docker creates; only used when nothing else has an address.
const VIRTUAL_PREFIXES: [&str; 3] = ["docker", "br-", "veth"];

#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoRepo;

impl SysinfoRepo {
    pub fn new() -> Self {
        Self
    }

    /// First non-loopback IPv4 of this host, empty when there is none.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "local_ipv4"))]
    pub async fn local_ipv4(&self) -> String {
        let found = tokio::task::spawn_blocking(|| {
            let networks = Networks::new_with_refreshed_list();
            let interfaces: Vec<(String, Vec<IpAddr>)> = networks
                .list()
                .iter()
                .map(|(name, data)| {
                    (
                        name.clone(),
                        data.ip_networks().iter().map(|n| n.addr).collect(),
                    )
                })
                .collect();
            pick_ipv4(interfaces)
        })
        .await;
        match found {
            Ok(ip) => ip.map(|ip| ip.to_string()).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "sysinfo task join failed");
                String::new()
            }
        }
    }
}

/// Physical interfaces first, then by name, so the answer is stable across calls.
pub(crate) fn pick_ipv4(mut interfaces: Vec<(String, Vec<IpAddr>)>) -> Option<Ipv4Addr> {
    interfaces.sort_by(|(a, _), (b, _)| (is_virtual(a), a).cmp(&(is_virtual(b), b)));
    interfaces
        .into_iter()
        .flat_map(|(_, addrs)| addrs)
        .find_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
            _ => None,
        })
}

fn is_virtual(name: &str) -> bool {
    VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p))
}
