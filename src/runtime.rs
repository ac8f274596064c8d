// Container runtime capability consumed by the facade.
// Records here are runtime-neutral; the Docker adapter lives in docker_repo.

use crate::error::Result;
use crate::models::{CpuMemorySample, PortBinding};
use async_trait::async_trait;
use bytes::Bytes;

/// One entry of a container listing, before any health probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeContainer {
    pub id: String,
    /// Runtime names; Docker prefixes them with `/`.
    pub names: Vec<String>,
    pub image: String,
    pub state: String,
    pub status: String,
    pub networks: Vec<String>,
    pub ports: Vec<PortBinding>,
    /// Unix seconds.
    pub created: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerInspection {
    /// Health check status, `None` when the image defines no health check.
    pub health: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeNetwork {
    pub id: String,
    pub name: String,
    pub driver: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaemonInfo {
    pub operating_system: String,
    pub architecture: String,
    pub ncpu: i64,
    pub mem_total: i64,
    pub containers: i64,
    pub containers_running: i64,
    pub containers_stopped: i64,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn ping(&self) -> Result<()>;

    /// All containers, stopped ones included.
    async fn list_containers(&self) -> Result<Vec<RuntimeContainer>>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspection>;

    /// One non-streaming stats read (current + previous counters).
    async fn container_stats(&self, id: &str) -> Result<CpuMemorySample>;

    /// Last `tail` lines of stdout+stderr with timestamps, as the multiplexed
    /// byte stream (see `log_frame`). TTY containers yield unframed text.
    async fn container_logs(&self, id: &str, tail: &str) -> Result<Bytes>;

    async fn list_networks(&self) -> Result<Vec<RuntimeNetwork>>;

    /// Display names of containers attached to a network.
    async fn inspect_network(&self, id: &str) -> Result<Vec<String>>;

    async fn system_info(&self) -> Result<DaemonInfo>;

    async fn server_version(&self) -> Result<String>;
}
