// Crate identity baked in at build time

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent to Prometheus and the public-IP service, e.g. `infra-agent/0.3.0`.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
