// HTTP routes

mod auth;
mod http;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::service::InfraService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) service: Arc<InfraService>,
    pub(crate) config: Arc<AppConfig>,
}

pub fn app(service: Arc<InfraService>, config: AppConfig) -> Router {
    let state = AppState {
        service,
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/containers", get(http::containers)) // GET /containers
        .route("/containers/{*rest}", get(http::container_action)) // GET /containers/{id}/stats|logs
        .route("/networks", get(http::networks)) // GET /networks
        .route("/system", get(http::system)) // GET /system
        .route("/metrics/node", get(http::metrics_node)) // GET /metrics/node
        .route("/metrics/range", get(http::metrics_range)) // GET /metrics/range
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(http::health)) // GET /health (no key)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
