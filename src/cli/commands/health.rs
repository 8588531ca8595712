use std::time::Duration;

use clap::Args;
use serde_json::Value;

use crate::cli::{utils::{output_error, output_fields}, OutputFormat};

#[derive(Args)]
pub struct HealthArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, default_value_t = 5_000, help = "Request timeout in milliseconds")]
    pub timeout_ms: u64,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(args.timeout_ms))
        .build()?;
    let endpoint = format!("{}/health", args.url.trim_end_matches('/'));

    let response = match client.get(&endpoint).send().await {
        Ok(response) => response,
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", endpoint, e))?;
            anyhow::bail!("health check failed");
        }
    };

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    output_fields(output_format, &body)?;

    if !status.is_success() {
        anyhow::bail!("server reported {}", status);
    }
    Ok(())
}
