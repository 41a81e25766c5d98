pub mod commands;
pub mod shell;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::PortalError;
use shell::Shell;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Matchmaker portal - member and staff client")]
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
    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Own member profile and registration")]
    Member {
        #[command(subcommand)]
        cmd: commands::member::MemberCommands,
    },

    #[command(about = "Browse candidate client profiles")]
    Client {
        #[command(subcommand)]
        cmd: commands::client::ClientCommands,
    },

    #[command(about = "Open a portal screen by path and show where the guards send you")]
    Open {
        #[arg(help = "Screen path, e.g. /client or /admin/member")]
        path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

pub async fn run(cli: Cli, config: &PortalConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let shell = Shell::open(config)?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &shell, &output_format).await,
        Commands::Member { cmd } => commands::member::handle(cmd, &shell, &output_format).await,
        Commands::Client { cmd } => commands::client::handle(cmd, &shell, &output_format).await,
        Commands::Open { path } => commands::open::handle(&path, &shell, &output_format),
    };

    if let Err(e) = &result {
        if let Some(portal_error) = e.downcast_ref::<PortalError>() {
            utils::output_error(&output_format, portal_error)?;
        }
    }
    utils::output_location(&output_format, shell.location().as_ref())?;

    result
}
