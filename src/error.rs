// Agent error type shared by the runtime adapter, metrics client and facade

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Docker daemon failure; the daemon's message is surfaced as-is.
    #[error("{0}")]
    Docker(#[from] bollard::errors::Error),

    /// Transport or decode failure against an outbound HTTP service.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("prometheus query failed: {0}")]
    Backend(String),

    #[error("no data")]
    NoData,

    #[error("Prometheus not configured")]
    MetricsNotConfigured,

    #[error("{0} required")]
    MissingParameter(&'static str),

    #[error("operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Runtime(String),
}

/// Run `fut` under a deadline; expiry drops (and so cancels) the outbound call.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AgentError::Timeout(deadline)),
    }
}
