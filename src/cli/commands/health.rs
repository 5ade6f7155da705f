use clap::Args;
use serde_json::Value;

use crate::cli::utils::{base_url, output_details};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[arg(long, env = "ORGSUITE_URL", default_value = "http://localhost:3000")]
    pub url: String,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url(&args.url));
    let response = reqwest::get(&url).await?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    output_details(output_format, &format!("{} -> {}", url, status), &body)?;
    if !status.is_success() {
        anyhow::bail!("server reported {}", status);
    }
    Ok(())
}
