// Facade over the container runtime and the metrics backend.
// Stateless: every call builds fresh values, nothing is cached between requests.

use crate::config::AppConfig;
use crate::error::{AgentError, Result};
use crate::log_frame;
use crate::models::{
    ContainerLogs, ContainerState, ContainerStats, ContainerSummary, MetricsRange, NetworkSummary,
    NodeMetrics, SystemSnapshot, short_id,
};
use crate::prometheus_repo::query::{self, MetricScope, RangeWindow};
use crate::prometheus_repo::response::{normalize_instant, normalize_range};
use crate::prometheus_repo::{MetricsBackend, PrometheusRepo, TimeRange};
use crate::public_ip::fetch_public_ip;
use crate::runtime::{ContainerRuntime, RuntimeContainer};
use crate::sysinfo_repo::SysinfoRepo;
use crate::version;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Log lines returned when the caller gives no `tail`.
pub const DEFAULT_LOG_TAIL: &str = "50";

pub struct InfraService {
    runtime: Arc<dyn ContainerRuntime>,
    metrics: Option<Arc<dyn MetricsBackend>>,
    sysinfo_repo: SysinfoRepo,
    http: reqwest::Client,
    public_ip_url: String,
}

impl InfraService {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        metrics: Option<Arc<dyn MetricsBackend>>,
        http: reqwest::Client,
        public_ip_url: impl Into<String>,
    ) -> Self {
        Self {
            runtime,
            metrics,
            sysinfo_repo: SysinfoRepo::new(),
            http,
            public_ip_url: public_ip_url.into(),
        }
    }

    /// Wire the Prometheus client (when a URL is configured) around `runtime`.
    pub fn from_config(
        runtime: Arc<dyn ContainerRuntime>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(version::user_agent())
            .timeout(config.timeouts.request())
            .build()?;
        let metrics: Option<Arc<dyn MetricsBackend>> = config
            .prometheus
            .configured()
            .then(|| {
                Arc::new(PrometheusRepo::new(http.clone(), &config.prometheus.url))
                    as Arc<dyn MetricsBackend>
            });
        Ok(Self::new(runtime, metrics, http, &config.public_ip.url))
    }

    pub async fn health(&self) -> Result<()> {
        self.runtime.ping().await
    }

    #[instrument(skip(self))]
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let containers = self.runtime.list_containers().await?;
        Ok(join_all(containers.into_iter().map(|c| self.summarize(c))).await)
    }

    async fn summarize(&self, c: RuntimeContainer) -> ContainerSummary {
        let state = ContainerState::from_docker(&c.state);
        let health = if state == ContainerState::Running {
            match self.runtime.inspect_container(&c.id).await {
                Ok(inspection) => inspection.health,
                Err(e) => {
                    warn!(container = %c.id, error = %e, "inspect failed; health omitted");
                    None
                }
            }
        } else {
            None
        };
        let name = c
            .names
            .first()
            .map(|n| n.trim_start_matches('/').to_string())
            .unwrap_or_default();

        ContainerSummary {
            id: short_id(&c.id),
            name,
            image: c.image,
            state,
            status: c.status,
            health,
            networks: c.networks,
            ports: c.ports,
            created: DateTime::from_timestamp(c.created, 0).unwrap_or_default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn container_stats(&self, id: &str) -> Result<ContainerStats> {
        let sample = self.runtime.container_stats(id).await?;
        Ok(ContainerStats::from_sample(&sample))
    }

    /// `tail` is passed to the daemon as-is ("all" included); empty means 50.
    #[instrument(skip(self))]
    pub async fn container_logs(&self, id: &str, tail: &str) -> Result<ContainerLogs> {
        let tail = if tail.is_empty() { DEFAULT_LOG_TAIL } else { tail };
        let raw = self.runtime.container_logs(id, tail).await?;
        Ok(ContainerLogs {
            container_id: id.to_string(),
            lines: log_frame::decode(&raw),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_networks(&self) -> Result<Vec<NetworkSummary>> {
        let networks = self.runtime.list_networks().await?;
        let user_networks = networks
            .into_iter()
            .filter(|n| !NetworkSummary::is_builtin(&n.name));

        Ok(join_all(user_networks.map(|n| async move {
            let containers = match self.runtime.inspect_network(&n.id).await {
                Ok(names) => names,
                Err(e) => {
                    warn!(network = %n.name, error = %e, "network inspect failed");
                    Vec::new()
                }
            };
            NetworkSummary {
                id: short_id(&n.id),
                name: n.name,
                driver: n.driver,
                containers,
            }
        }))
        .await)
    }

    #[instrument(skip(self))]
    pub async fn system_info(&self) -> Result<SystemSnapshot> {
        let info = self.runtime.system_info().await?;
        let (version, ip, public_ip) = tokio::join!(
            self.runtime.server_version(),
            self.sysinfo_repo.local_ipv4(),
            fetch_public_ip(&self.http, &self.public_ip_url),
        );
        let docker_version = version.unwrap_or_else(|e| {
            warn!(error = %e, "server version unavailable");
            String::new()
        });

        Ok(SystemSnapshot {
            os: info.operating_system,
            architecture: info.architecture,
            cpus: info.ncpu,
            memory_total: info.mem_total,
            docker_version,
            containers: info.containers,
            running: info.containers_running,
            stopped: info.containers_stopped,
            ip,
            public_ip,
        })
    }

    /// Latest host readings; a failed query only nulls its own entry.
    #[instrument(skip(self))]
    pub async fn node_metrics(&self) -> Result<NodeMetrics> {
        let backend = self.backend()?;
        let results = join_all(query::instant_queries().into_iter().map(|(name, expr)| {
            async move {
                let value = match backend.query(&expr).await {
                    Ok(resp) => normalize_instant(&resp),
                    Err(e) => Err(e),
                };
                let value = value
                    .inspect_err(|e| warn!(metric = name, error = %e, "instant query failed"))
                    .ok();
                (name.to_string(), value)
            }
        }))
        .await;
        Ok(results.into_iter().collect())
    }

    /// Chart series for `duration` (5m/15m/1h/24h), host-wide or for one container.
    #[instrument(skip(self))]
    pub async fn metrics_range(&self, duration: &str, container: &str) -> Result<MetricsRange> {
        let backend = self.backend()?;
        let window = RangeWindow::parse(duration);
        let scope = MetricScope::from_name(container);
        let range = TimeRange::ending_at(Utc::now(), window.span(), window.step());

        let fetched = join_all(query::compile_range(window, scope).into_iter().map(|q| {
            async move {
                let points = match backend.query_range(&q.expr, range).await {
                    Ok(resp) => normalize_range(&resp),
                    Err(e) => {
                        warn!(series = ?q.series, error = %e, "range query failed");
                        Vec::new()
                    }
                };
                (q.series, points)
            }
        }))
        .await;

        let mut out = MetricsRange::default();
        for (series, points) in fetched {
            out.set(series, points);
        }
        Ok(out)
    }

    fn backend(&self) -> Result<&dyn MetricsBackend> {
        self.metrics
            .as_deref()
            .ok_or(AgentError::MetricsNotConfigured)
    }
}
