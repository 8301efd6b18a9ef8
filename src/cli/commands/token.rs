use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::jwt;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a session token signed with AUTH_JWT_SECRET")]
    Issue {
        #[arg(long, help = "User id (UUID) the token is issued for")]
        user: Uuid,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, default_value_t = 1, help = "Lifetime in hours")]
        hours: i64,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user, email, hours } => {
            anyhow::ensure!(hours > 0, "--hours must be positive");
            let auth = &config::config().auth;

            let token = jwt::issue(
                &auth.jwt_secret,
                auth.jwt_audience.clone(),
                user,
                email,
                chrono::Duration::hours(hours),
            )?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "user_id": user, "expires_in": hours * 3600 })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
