// Best-effort public IPv4 lookup against an ipify-style `{"ip": "..."}` endpoint

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Per-lookup cap, kept well inside the `/system` request deadline.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Empty string when `url` is empty or the lookup fails for any reason.
pub async fn fetch_public_ip(client: &reqwest::Client, url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    match lookup(client, url, LOOKUP_TIMEOUT).await {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!(error = %e, "public IP lookup failed");
            String::new()
        }
    }
}

async fn lookup(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<String> {
    let body: IpResponse = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body.ip)
}
