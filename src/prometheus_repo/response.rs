// Prometheus HTTP API envelope -> scalars and point series

use crate::error::{AgentError, Result};
use crate::models::MetricPoint;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;

pub const STATUS_SUCCESS: &str = "success";

/// `/api/v1/query` and `/api/v1/query_range` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<PromData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromData {
    #[serde(default)]
    pub result: Vec<PromSeries>,
}

/// Instant queries fill `value`, range queries fill `values`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromSeries {
    #[serde(default)]
    pub value: Vec<Value>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl PromResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    fn first_series(&self) -> Option<&PromSeries> {
        self.data.as_ref().and_then(|d| d.result.first())
    }
}

/// First series of a range response as points. Failed or empty responses give an
/// empty list; undecodable samples are skipped.
pub fn normalize_range(resp: &PromResponse) -> Vec<MetricPoint> {
    if !resp.is_success() {
        tracing::debug!(status = %resp.status, error = ?resp.error, "range query not successful");
        return Vec::new();
    }
    let Some(series) = resp.first_series() else {
        return Vec::new();
    };
    series
        .values
        .iter()
        .filter_map(|pair| {
            let (ts, value) = sample(pair)?;
            Some(MetricPoint {
                time: format_timestamp(ts)?,
                value,
            })
        })
        .collect()
}

/// The scalar of the first series of an instant response.
pub fn normalize_instant(resp: &PromResponse) -> Result<f64> {
    if !resp.is_success() {
        return Err(AgentError::Backend(
            resp.error
                .clone()
                .unwrap_or_else(|| format!("status {:?}", resp.status)),
        ));
    }
    resp.first_series()
        .and_then(|s| sample(&s.value))
        .map(|(_, value)| value)
        .ok_or(AgentError::NoData)
}

/// Unix seconds -> local `HH:MM:SS`.
pub fn format_timestamp(ts: f64) -> Option<String> {
    let utc = DateTime::from_timestamp(ts.trunc() as i64, 0)?;
    Some(utc.with_timezone(&Local).format("%H:%M:%S").to_string())
}

/// `[<unix seconds>, "<value>"]`; anything else, including NaN/Inf, is rejected.
fn sample(pair: &[Value]) -> Option<(f64, f64)> {
    let [ts, value] = pair else {
        return None;
    };
    let ts = ts.as_f64()?;
    let value: f64 = value.as_str()?.parse().ok()?;
    value.is_finite().then_some((ts, value))
}
