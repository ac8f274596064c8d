// Shared test helpers: in-memory runtime and metrics backend

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use infra_agent::config::AppConfig;
use infra_agent::error::{AgentError, Result};
use infra_agent::log_frame::{self, StreamKind};
use infra_agent::models::{CpuMemorySample, PortBinding};
use infra_agent::prometheus_repo::response::PromResponse;
use infra_agent::prometheus_repo::{MetricsBackend, TimeRange};
use infra_agent::routes;
use infra_agent::runtime::{
    ContainerInspection, ContainerRuntime, DaemonInfo, RuntimeContainer, RuntimeNetwork,
};
use infra_agent::service::InfraService;
use std::sync::{Arc, Mutex};

pub const API_KEY: &str = "s3cret";

pub const WEB_ID: &str = "0123456789abcdef0123456789abcdef";
pub const DB_ID: &str = "fedcba9876543210fedcba9876543210";

#[derive(Default)]
pub struct FakeRuntime {
    pub ping_error: Option<String>,
    pub containers: Vec<RuntimeContainer>,
    pub logs: Bytes,
    pub networks: Vec<RuntimeNetwork>,
    /// Tails the service asked for, in call order.
    pub requested_tails: Mutex<Vec<String>>,
    /// Container ids that were health-probed.
    pub inspected: Mutex<Vec<String>>,
    /// Ping and container listing never complete.
    pub stalled: bool,
}

impl FakeRuntime {
    /// A running `web` with a published and an unpublished port, plus a stopped `db`.
    pub fn with_sample_data() -> Self {
        Self {
            containers: vec![
                RuntimeContainer {
                    id: WEB_ID.into(),
                    names: vec!["/web".into()],
                    image: "nginx:1.27".into(),
                    state: "running".into(),
                    status: "Up 2 hours".into(),
                    networks: vec!["frontend".into()],
                    ports: vec![PortBinding::new(80, 8080, "tcp"), PortBinding::new(443, 0, "tcp")],
                    created: 1_700_000_000,
                },
                RuntimeContainer {
                    id: DB_ID.into(),
                    names: vec!["/db".into()],
                    image: "postgres:16".into(),
                    state: "exited".into(),
                    status: "Exited (0) 3 days ago".into(),
                    networks: Vec::new(),
                    ports: Vec::new(),
                    created: 1_690_000_000,
                },
            ],
            logs: framed(&[(StreamKind::Stdout, "hello\n"), (StreamKind::Stderr, "oops\n")]),
            networks: vec![
                RuntimeNetwork {
                    id: "aaaaaaaaaaaabbbbbbbbbbbb".into(),
                    name: "bridge".into(),
                    driver: "bridge".into(),
                },
                RuntimeNetwork {
                    id: "hosthosthosthosthost".into(),
                    name: "host".into(),
                    driver: "host".into(),
                },
                RuntimeNetwork {
                    id: "1111111111112222222222".into(),
                    name: "frontend".into(),
                    driver: "bridge".into(),
                },
            ],
            ..Default::default()
        }
    }

    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::with_sample_data()
        }
    }

    async fn maybe_stall(&self) {
        if self.stalled {
            std::future::pending::<()>().await;
        }
    }

    pub fn unreachable(msg: &str) -> Self {
        Self {
            ping_error: Some(msg.into()),
            ..Default::default()
        }
    }
}

pub fn framed(frames: &[(StreamKind, &str)]) -> Bytes {
    let mut buf = BytesMut::new();
    for (kind, payload) in frames {
        log_frame::encode_frame(&mut buf, *kind, payload.as_bytes());
    }
    buf.freeze()
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ping(&self) -> Result<()> {
        self.maybe_stall().await;
        match &self.ping_error {
            Some(msg) => Err(AgentError::Runtime(msg.clone())),
            None => Ok(()),
        }
    }

    async fn list_containers(&self) -> Result<Vec<RuntimeContainer>> {
        self.maybe_stall().await;
        Ok(self.containers.clone())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspection> {
        self.inspected.lock().unwrap().push(id.to_string());
        Ok(ContainerInspection {
            health: Some("healthy".into()),
        })
    }

    async fn container_stats(&self, _id: &str) -> Result<CpuMemorySample> {
        Ok(CpuMemorySample {
            cpu_total: 400_000_000,
            precpu_total: 200_000_000,
            system_total: 20_000_000_000,
            presystem_total: 10_000_000_000,
            online_cpus: 4,
            memory_usage: 150 * 1024 * 1024,
            memory_cache: 50 * 1024 * 1024,
            memory_limit: 1024 * 1024 * 1024,
        })
    }

    async fn container_logs(&self, _id: &str, tail: &str) -> Result<Bytes> {
        self.requested_tails.lock().unwrap().push(tail.to_string());
        Ok(self.logs.clone())
    }

    async fn list_networks(&self) -> Result<Vec<RuntimeNetwork>> {
        Ok(self.networks.clone())
    }

    async fn inspect_network(&self, id: &str) -> Result<Vec<String>> {
        if id.starts_with("1111") {
            Ok(vec!["web".into()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn system_info(&self) -> Result<DaemonInfo> {
        Ok(DaemonInfo {
            operating_system: "Debian GNU/Linux 12 (bookworm)".into(),
            architecture: "x86_64".into(),
            ncpu: 8,
            mem_total: 16_000_000_000,
            containers: 2,
            containers_running: 1,
            containers_stopped: 1,
        })
    }

    async fn server_version(&self) -> Result<String> {
        Ok("27.3.1".into())
    }
}

/// Answers every query with fixed data. Expressions containing `fail_on` fail at the
/// transport; those containing `reject_on` get a well-formed `"status":"error"` body.
#[derive(Default)]
pub struct FakeMetrics {
    pub fail_on: Option<&'static str>,
    pub reject_on: Option<&'static str>,
    pub range_exprs: Mutex<Vec<String>>,
}

const REJECTED: &str = r#"{"status":"error","errorType":"bad_data","error":"bad_data"}"#;

impl FakeMetrics {
    pub fn failing_on(needle: &'static str) -> Self {
        Self {
            fail_on: Some(needle),
            ..Default::default()
        }
    }

    pub fn rejecting(needle: &'static str) -> Self {
        Self {
            reject_on: Some(needle),
            ..Default::default()
        }
    }

    fn check(&self, expr: &str) -> Result<()> {
        match self.fail_on {
            Some(needle) if expr.contains(needle) => {
                Err(AgentError::Runtime("connection refused".into()))
            }
            _ => Ok(()),
        }
    }

    fn rejects(&self, expr: &str) -> bool {
        self.reject_on.is_some_and(|needle| expr.contains(needle))
    }
}

#[async_trait]
impl MetricsBackend for FakeMetrics {
    async fn query(&self, expr: &str) -> Result<PromResponse> {
        self.check(expr)?;
        if self.rejects(expr) {
            return Ok(serde_json::from_str(REJECTED).unwrap());
        }
        Ok(serde_json::from_str(
            r#"{"status":"success","data":{"resultType":"vector","result":[
                {"metric":{},"value":[1700000000.5,"42.5"]}
            ]}}"#,
        )
        .unwrap())
    }

    async fn query_range(&self, expr: &str, _range: TimeRange) -> Result<PromResponse> {
        self.range_exprs.lock().unwrap().push(expr.to_string());
        self.check(expr)?;
        if self.rejects(expr) {
            return Ok(serde_json::from_str(REJECTED).unwrap());
        }
        Ok(serde_json::from_str(
            r#"{"status":"success","data":{"resultType":"matrix","result":[
                {"metric":{},"values":[[1700000000,"10"],[1700000015,"12.5"]]}
            ]}}"#,
        )
        .unwrap())
    }
}

pub fn test_config(api_key: &str) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "INFRA_API_KEY" => Some(api_key.to_string()),
        "PUBLIC_IP_URL" => Some(String::new()),
        _ => None,
    })
    .unwrap()
}

/// Open access with one-second health and request deadlines.
pub fn short_deadline_config() -> AppConfig {
    let mut config = test_config("");
    config.timeouts.health_secs = 1;
    config.timeouts.request_secs = 1;
    config
}

pub fn service(runtime: Arc<FakeRuntime>, metrics: Option<Arc<FakeMetrics>>) -> InfraService {
    let metrics = metrics.map(|m| m as Arc<dyn MetricsBackend>);
    InfraService::new(runtime, metrics, reqwest::Client::new(), "")
}

pub fn test_app(runtime: FakeRuntime, metrics: Option<FakeMetrics>, api_key: &str) -> axum::Router {
    let service = service(Arc::new(runtime), metrics.map(Arc::new));
    routes::app(Arc::new(service), test_config(api_key))
}
