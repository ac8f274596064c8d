// Host + daemon identity

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub os: String,
    pub architecture: String,
    pub cpus: i64,
    pub memory_total: i64,
    pub docker_version: String,
    pub containers: i64,
    pub running: i64,
    pub stopped: i64,
    /// First non-loopback IPv4 of this host; empty when none found.
    pub ip: String,
    /// Best-effort; empty string when the lookup fails or is disabled.
    #[serde(rename = "publicIP")]
    pub public_ip: String,
}
