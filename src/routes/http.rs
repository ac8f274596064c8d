// GET handlers: health, containers, networks, system, metrics

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{AgentError, with_deadline};

/// `{"error": "..."}` with the status chosen for the route.
pub(super) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Input and configuration errors keep their own status; everything else gets `status`.
    fn from_agent(status: StatusCode, err: AgentError) -> Self {
        let status = match err {
            AgentError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AgentError::MetricsNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => status,
        };
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "not found".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn internal(err: AgentError) -> ApiError {
    ApiError::from_agent(StatusCode::INTERNAL_SERVER_ERROR, err)
}

fn unavailable(err: AgentError) -> ApiError {
    ApiError::from_agent(StatusCode::SERVICE_UNAVAILABLE, err)
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// GET /health: 503 with the ping error when the daemon is unreachable.
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let deadline = state.config.timeouts.health();
    match with_deadline(deadline, state.service.health()).await {
        Ok(()) => Json(HealthBody {
            status: "healthy",
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "unhealthy",
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

pub(super) async fn containers(State(state): State<AppState>) -> Result<Response, ApiError> {
    let deadline = state.config.timeouts.request();
    let containers = with_deadline(deadline, state.service.list_containers())
        .await
        .map_err(internal)?;
    Ok(Json(containers).into_response())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ContainerAction {
    Stats,
    Logs,
}

/// Split the wildcard tail of `/containers/...` into `(id, action)`.
/// The id is empty for `/containers//stats`; unknown actions give `None`.
pub(super) fn parse_container_path(rest: &str) -> Option<(&str, ContainerAction)> {
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let (id, action) = rest.rsplit_once('/').unwrap_or(("", rest));
    let action = match action {
        "stats" => ContainerAction::Stats,
        "logs" => ContainerAction::Logs,
        _ => return None,
    };
    Some((id, action))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ContainerQuery {
    tail: Option<String>,
}

/// GET /containers/{id}/stats and GET /containers/{id}/logs?tail=N
pub(super) async fn container_action(
    State(state): State<AppState>,
    Path(rest): Path<String>,
    Query(query): Query<ContainerQuery>,
) -> Result<Response, ApiError> {
    let (id, action) = parse_container_path(&rest).ok_or_else(ApiError::not_found)?;
    if id.is_empty() {
        return Err(internal(AgentError::MissingParameter("container ID")));
    }

    let deadline = state.config.timeouts.request();
    match action {
        ContainerAction::Stats => {
            let stats = with_deadline(deadline, state.service.container_stats(id))
                .await
                .map_err(internal)?;
            Ok(Json(stats).into_response())
        }
        ContainerAction::Logs => {
            let tail = query.tail.unwrap_or_default();
            let logs = with_deadline(deadline, state.service.container_logs(id, &tail))
                .await
                .map_err(internal)?;
            Ok(Json(logs).into_response())
        }
    }
}

pub(super) async fn networks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let deadline = state.config.timeouts.request();
    let networks = with_deadline(deadline, state.service.list_networks())
        .await
        .map_err(internal)?;
    Ok(Json(networks).into_response())
}

pub(super) async fn system(State(state): State<AppState>) -> Result<Response, ApiError> {
    let deadline = state.config.timeouts.request();
    let info = with_deadline(deadline, state.service.system_info())
        .await
        .map_err(internal)?;
    Ok(Json(info).into_response())
}

/// GET /metrics/node: map of metric name to number or null.
pub(super) async fn metrics_node(State(state): State<AppState>) -> Result<Response, ApiError> {
    let deadline = state.config.timeouts.request();
    let metrics = with_deadline(deadline, state.service.node_metrics())
        .await
        .map_err(unavailable)?;
    Ok(Json(metrics).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RangeParams {
    duration: Option<String>,
    container: Option<String>,
}

/// GET /metrics/range?duration=5m|15m|1h|24h&container=NAME
pub(super) async fn metrics_range(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Response, ApiError> {
    let duration = params.duration.unwrap_or_else(|| "5m".to_string());
    let container = params.container.unwrap_or_default();
    let deadline = state.config.timeouts.request();
    let range = with_deadline(
        deadline,
        state.service.metrics_range(&duration, &container),
    )
    .await
    .map_err(unavailable)?;
    Ok(Json(range).into_response())
}
