use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::issue_session_token;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id the token is issued for")]
    pub user: Uuid,

    #[arg(long, help = "Email embedded in the token")]
    pub email: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let token =
        issue_session_token(security, args.user, args.email).context("failed to sign session token")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "token": token,
                "user_id": args.user,
                "expires_in_hours": security.session_expiry_hours,
            }))?
        ),
        // Bare token so it can be captured by shell scripts
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
