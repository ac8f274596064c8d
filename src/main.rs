use anyhow::{Context, Result};
use infra_agent::runtime::ContainerRuntime;
use infra_agent::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!("{} {} starting", version::NAME, version::VERSION);

    if !app_config.auth.enabled() {
        tracing::warn!("INFRA_API_KEY is empty; API endpoints are unauthenticated");
    }
    if app_config.prometheus.configured() {
        tracing::info!(url = %app_config.prometheus.url, "Prometheus metrics enabled");
    } else {
        tracing::warn!("PROMETHEUS_URL not set; /metrics endpoints will answer 503");
    }

    // No daemon, no agent
    let docker_repo = docker_repo::DockerRepo::connect().context("connecting to Docker")?;
    error::with_deadline(app_config.timeouts.health(), docker_repo.ping())
        .await
        .context("Docker daemon unreachable")?;
    tracing::info!("Connected to Docker");

    let service = service::InfraService::from_config(Arc::new(docker_repo), &app_config)?;
    let app = routes::app(Arc::new(service), app_config.clone());

    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received shutdown signal");
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
