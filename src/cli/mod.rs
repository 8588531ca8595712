pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "studyhub")]
#[command(about = "StudyHub CLI - development helpers for the StudyHub API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a bearer token signed with the configured JWT secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Print the normalized hash of question texts")]
    Hash(commands::hash::HashArgs),

    #[command(about = "Check a running server's /health endpoint")]
    Health(commands::health::HealthArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Hash(args) => commands::hash::handle(args, output_format),
        Commands::Health(args) => commands::health::handle(args, output_format).await,
    }
}
