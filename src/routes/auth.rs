// X-API-Key check for every route except /health

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::AppState;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// No-op when no key is configured.
pub(super) async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let auth = &state.config.auth;
    if auth.enabled() {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(auth.api_key.as_str()) {
            warn!(path = %req.uri().path(), "rejected request: missing or wrong API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "unauthorized" })),
            )
                .into_response();
        }
    }
    next.run(req).await
}
