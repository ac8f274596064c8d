// Prometheus HTTP API client

pub mod query;
pub mod response;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use response::PromResponse;
use std::time::Duration;
use tracing::instrument;

/// Inclusive evaluation window for a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: &'static str,
}

impl TimeRange {
    /// `span` back from `end`, sampled every `step`.
    pub fn ending_at(end: DateTime<Utc>, span: Duration, step: &'static str) -> Self {
        let span = chrono::Duration::from_std(span).unwrap_or(chrono::Duration::zero());
        Self {
            start: end - span,
            end,
            step,
        }
    }
}

/// Time-series backend capability: the raw response envelope for one expression.
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    async fn query(&self, expr: &str) -> Result<PromResponse>;

    async fn query_range(&self, expr: &str, range: TimeRange) -> Result<PromResponse>;
}

pub struct PrometheusRepo {
    client: reqwest::Client,
    base_url: String,
}

impl PrometheusRepo {
    /// `base_url` without trailing slash, e.g. `http://prometheus:9090`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<PromResponse> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await?
            .json::<PromResponse>()
            .await?;
        Ok(resp)
    }
}

#[async_trait]
impl MetricsBackend for PrometheusRepo {
    #[instrument(skip(self), fields(repo = "prometheus", operation = "query"))]
    async fn query(&self, expr: &str) -> Result<PromResponse> {
        self.get("/api/v1/query", &[("query", expr.to_string())])
            .await
    }

    #[instrument(skip(self), fields(repo = "prometheus", operation = "query_range"))]
    async fn query_range(&self, expr: &str, range: TimeRange) -> Result<PromResponse> {
        let params = [
            ("query", expr.to_string()),
            ("start", range.start.timestamp().to_string()),
            ("end", range.end.timestamp().to_string()),
            ("step", range.step.to_string()),
        ];
        self.get("/api/v1/query_range", &params).await
    }
}
