use anyhow::Context;
use clap::{Args, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::utils::{base_url, output_success};
use crate::cli::OutputFormat;
use crate::middleware::tenant::{ORG_HEADER, ROLES_HEADER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Contacts,
    EmergencyContacts,
    JobHistory,
    Transactions,
}

impl ExportTarget {
    pub fn path(self) -> &'static str {
        match self {
            ExportTarget::Contacts => "/api/v1/contacts/export",
            ExportTarget::EmergencyContacts => "/api/v1/emergency-contacts/export",
            ExportTarget::JobHistory => "/api/v1/job-history/export",
            ExportTarget::Transactions => "/api/v1/finance/transactions/export",
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub target: ExportTarget,

    #[arg(long, env = "ORGSUITE_URL", default_value = "http://localhost:3000")]
    pub url: String,

    #[arg(long, help = "Organization id sent as x-org-id")]
    pub org: Uuid,

    #[arg(long, env = "ORGSUITE_TOKEN", help = "Session token sent as a Bearer credential")]
    pub token: String,

    #[arg(long, default_value = "manager", help = "Comma-separated roles sent as x-roles")]
    pub roles: String,

    #[arg(long, short, help = "Write to this file instead of stdout")]
    pub output: Option<PathBuf>,
}

pub async fn handle(args: ExportArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}{}", base_url(&args.url), args.target.path());
    let response = reqwest::Client::new()
        .get(&url)
        .bearer_auth(&args.token)
        .header(ORG_HEADER, args.org.to_string())
        .header(ROLES_HEADER, &args.roles)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        anyhow::bail!("export failed with {}: {}", status, body);
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, &body).with_context(|| format!("failed to write {}", path.display()))?;
            output_success(
                output_format,
                &format!("Wrote {}", path.display()),
                Some(json!({ "path": path, "bytes": body.len() })),
            )
        }
        None => {
            print!("{}", body);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_map_to_export_routes() {
        assert_eq!(ExportTarget::Transactions.path(), "/api/v1/finance/transactions/export");
        assert_eq!(ExportTarget::EmergencyContacts.path(), "/api/v1/emergency-contacts/export");
    }
}
