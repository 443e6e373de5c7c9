use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

/// GET <url>/health and report the result. Exits non-zero when the server
/// is unreachable or degraded.
pub async fn ping(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("failed to build HTTP client")?;

    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        output_success(&output_format, &format!("{} is healthy", url), body.get("data").cloned())
    } else {
        output_error(
            &output_format,
            &format!("{} answered {}", url, status),
            body.get("code").and_then(Value::as_str),
        )?;
        anyhow::bail!("server unhealthy")
    }
}
