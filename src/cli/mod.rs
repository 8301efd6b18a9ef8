pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ctfc")]
#[command(about = "CTF Connect CLI - inspect routing, onboarding steps, tokens and the profile store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Classify a path against the configured route sets")]
    Route {
        #[arg(help = "Request path, e.g. /dashboard")]
        path: String,
    },

    #[command(about = "List the onboarding wizard steps")]
    Steps,

    #[command(about = "Development session tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Profile database maintenance")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Route { path } => commands::route::handle(&path, output_format),
        Commands::Steps => commands::steps::handle(output_format),
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["ctfc", "route", "/dashboard", "--json"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Route { ref path } if path == "/dashboard"));
    }

    #[test]
    fn parses_token_issue() {
        let cli = Cli::try_parse_from([
            "ctfc",
            "token",
            "issue",
            "--user",
            "6f1c1f3e-1d55-4f4e-9d3c-1b2f1ad0b7a1",
            "--hours",
            "2",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));
        assert!(matches!(cli.command, Commands::Token { .. }));
    }
}
