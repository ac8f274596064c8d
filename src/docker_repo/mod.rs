// Docker daemon access via bollard

mod stats;

use crate::error::{AgentError, Result};
use crate::log_frame::{self, StreamKind};
use crate::models::{CpuMemorySample, PortBinding};
use crate::runtime::{
    ContainerInspection, ContainerRuntime, DaemonInfo, RuntimeContainer, RuntimeNetwork,
};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::query_parameters::{
    InspectContainerOptions, InspectNetworkOptions, ListContainersOptions, ListNetworksOptions,
    LogsOptions, StatsOptions,
};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::instrument;

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Connect using `DOCKER_HOST` when set, the local socket otherwise.
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRepo {
    #[instrument(skip(self), fields(repo = "docker", operation = "ping"))]
    async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_containers"))]
    async fn list_containers(&self) -> Result<Vec<RuntimeContainer>> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;

        Ok(containers
            .into_iter()
            .map(|c| RuntimeContainer {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                image: c.image.unwrap_or_default(),
                state: c.state.map(|s| s.to_string()).unwrap_or_default(),
                status: c.status.unwrap_or_default(),
                networks: c
                    .network_settings
                    .and_then(|n| n.networks)
                    .map(|n| n.into_keys().collect())
                    .unwrap_or_default(),
                ports: c
                    .ports
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| {
                        PortBinding::new(
                            p.private_port,
                            p.public_port.unwrap_or(0),
                            p.typ.map(|t| t.to_string()).unwrap_or_default(),
                        )
                    })
                    .collect(),
                created: c.created.unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "inspect_container"))]
    async fn inspect_container(&self, id: &str) -> Result<ContainerInspection> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        let health = inspect
            .state
            .and_then(|s| s.health)
            .and_then(|h| h.status)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());
        Ok(ContainerInspection { health })
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "container_stats"))]
    async fn container_stats(&self, id: &str) -> Result<CpuMemorySample> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        let response = stream
            .next()
            .await
            .ok_or_else(|| AgentError::Runtime(format!("no stats returned for {id}")))??;
        stats::process_statistics(&response)
            .ok_or_else(|| AgentError::Runtime(format!("incomplete stats for {id}")))
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "container_logs"))]
    async fn container_logs(&self, id: &str, tail: &str) -> Result<Bytes> {
        let options = LogsOptions {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));

        // bollard splits frames for us; put the wire framing back so the decoder
        // sees exactly what the daemon sent. TTY output was never framed.
        let mut raw = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            append_output(&mut raw, chunk?);
        }
        Ok(raw.freeze())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "list_networks"))]
    async fn list_networks(&self) -> Result<Vec<RuntimeNetwork>> {
        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions>)
            .await?;
        Ok(networks
            .into_iter()
            .map(|n| RuntimeNetwork {
                id: n.id.unwrap_or_default(),
                name: n.name.unwrap_or_default(),
                driver: n.driver.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "inspect_network"))]
    async fn inspect_network(&self, id: &str) -> Result<Vec<String>> {
        let network = self
            .docker
            .inspect_network(id, None::<InspectNetworkOptions>)
            .await?;
        Ok(network
            .containers
            .unwrap_or_default()
            .into_values()
            .filter_map(|endpoint| endpoint.name)
            .collect())
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "system_info"))]
    async fn system_info(&self) -> Result<DaemonInfo> {
        let info = self.docker.info().await?;
        Ok(DaemonInfo {
            operating_system: info.operating_system.unwrap_or_default(),
            architecture: info.architecture.unwrap_or_default(),
            ncpu: info.ncpu.unwrap_or(0),
            mem_total: info.mem_total.unwrap_or(0),
            containers: info.containers.unwrap_or(0),
            containers_running: info.containers_running.unwrap_or(0),
            containers_stopped: info.containers_stopped.unwrap_or(0),
        })
    }

    #[instrument(skip(self), fields(repo = "docker", operation = "server_version"))]
    async fn server_version(&self) -> Result<String> {
        let version = self.docker.version().await?;
        Ok(version.version.unwrap_or_default())
    }
}

/// Re-frame one demultiplexed chunk. Empty writes are dropped: a zero-length
/// header is indistinguishable from unframed text and would swallow the rest.
fn append_output(raw: &mut BytesMut, chunk: LogOutput) {
    let (stream, message) = match chunk {
        LogOutput::StdOut { message } => (StreamKind::Stdout, message),
        LogOutput::StdErr { message } => (StreamKind::Stderr, message),
        LogOutput::StdIn { message } => (StreamKind::Stdin, message),
        LogOutput::Console { message } => {
            raw.extend_from_slice(&message);
            return;
        }
    };
    if !message.is_empty() {
        log_frame::encode_frame(raw, stream, &message);
    }
}
