// Docker network models

use serde::{Deserialize, Serialize};

/// Networks the daemon always creates; never listed.
pub const BUILTIN_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
    pub driver: String,
    /// Display names of attached containers.
    #[serde(default)]
    pub containers: Vec<String>,
}

impl NetworkSummary {
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_NETWORKS.contains(&name)
    }
}
