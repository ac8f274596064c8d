use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org?format=json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub prometheus: PrometheusConfig,
    pub public_ip: PublicIpConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Required value of `X-API-Key`. Empty disables authentication entirely.
    pub api_key: String,
}

impl AuthConfig {
    pub fn enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Base URL, e.g. `http://prometheus:9090`. Empty: metrics endpoints answer 503.
    pub url: String,
}

impl PrometheusConfig {
    pub fn configured(&self) -> bool {
        !self.url.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicIpConfig {
    /// Service answering `{"ip": "..."}`. Empty disables the lookup.
    pub url: String,
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PUBLIC_IP_URL.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub health_secs: u64,
    /// Deadline for every Docker / Prometheus read.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            health_secs: 5,
            request_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn health(&self) -> Duration {
        Duration::from_secs(self.health_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl AppConfig {
    /// Defaults, then `CONFIG_FILE` (TOML) when set, then environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
                toml::from_str(&s)?
            }
            Err(_) => AppConfig::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.with_overrides(|_| None)
    }

    /// Defaults plus overrides from `lookup` (tests pass a map instead of the real env).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        AppConfig::default().with_overrides(lookup)
    }

    /// Apply `HOST`, `PORT`, `INFRA_API_KEY`, `PROMETHEUS_URL`, `PUBLIC_IP_URL`, then validate.
    pub fn with_overrides<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {:?}: {}", port, e))?;
        }
        if let Some(key) = lookup("INFRA_API_KEY") {
            self.auth.api_key = key;
        }
        if let Some(url) = lookup("PROMETHEUS_URL") {
            self.prometheus.url = url;
        }
        if let Some(url) = lookup("PUBLIC_IP_URL") {
            self.public_ip.url = url;
        }
        self.prometheus.url = self.prometheus.url.trim().trim_end_matches('/').to_string();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            !self.prometheus.configured()
                || self.prometheus.url.starts_with("http://")
                || self.prometheus.url.starts_with("https://"),
            "prometheus.url must start with http:// or https://, got {:?}",
            self.prometheus.url
        );
        anyhow::ensure!(
            self.timeouts.health_secs > 0,
            "timeouts.health_secs must be > 0, got {}",
            self.timeouts.health_secs
        );
        anyhow::ensure!(
            self.timeouts.request_secs > 0,
            "timeouts.request_secs must be > 0, got {}",
            self.timeouts.request_secs
        );
        Ok(())
    }
}
