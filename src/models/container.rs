// Docker container models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the short container/network ID shown to clients.
pub const SHORT_ID_LEN: usize = 12;

/// First 12 characters of a Docker ID (shorter IDs are returned whole).
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Docker container lifecycle state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortBinding {
    pub private_port: u16,
    /// `None` when the port is not published on the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    #[serde(rename = "type")]
    pub type_: String,
}

impl PortBinding {
    /// Docker reports unpublished ports as public port 0.
    pub fn new(private_port: u16, public_port: u16, type_: impl Into<String>) -> Self {
        Self {
            private_port,
            public_port: (public_port != 0).then_some(public_port),
            type_: type_.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub status: String,
    /// Only probed for running containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub ports: Vec<PortBinding>,
    pub created: DateTime<Utc>,
}

/// Two consecutive CPU/memory counter snapshots as reported by one stats call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuMemorySample {
    pub cpu_total: u64,
    pub precpu_total: u64,
    pub system_total: u64,
    pub presystem_total: u64,
    pub online_cpus: u32,
    pub memory_usage: u64,
    pub memory_cache: u64,
    pub memory_limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStats {
    pub cpu_percent: f64,
    /// Bytes in use, page cache excluded.
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_percent: f64,
}

impl ContainerStats {
    pub fn from_sample(s: &CpuMemorySample) -> Self {
        let cpu_delta = s.cpu_total as i128 - s.precpu_total as i128;
        let system_delta = s.system_total as i128 - s.presystem_total as i128;
        let cpu_percent = if cpu_delta > 0 && system_delta > 0 {
            (cpu_delta as f64 / system_delta as f64) * s.online_cpus as f64 * 100.0
        } else {
            0.0
        };

        let memory_usage = s.memory_usage.saturating_sub(s.memory_cache);
        let memory_percent = if s.memory_limit > 0 {
            memory_usage as f64 / s.memory_limit as f64 * 100.0
        } else {
            0.0
        };

        Self {
            cpu_percent,
            memory_usage,
            memory_limit: s.memory_limit,
            memory_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLogs {
    pub container_id: String,
    pub lines: Vec<String>,
}
