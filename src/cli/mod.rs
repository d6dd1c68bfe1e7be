//! CLI commands for pairchat using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{Settings, ValidationMode};

/// pairchat - real-time pairwise chat relay.
#[derive(Parser)]
#[command(name = "pairchat")]
#[command(version = "0.1.0")]
#[command(about = "Real-time peer-to-peer chat relay", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server
    Serve {
        /// Bind host
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Bind port
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// Report malformed payloads with error events instead of
        /// dropping them silently
        #[arg(long)]
        strict: bool,
    },

    /// Print the resolved configuration
    Config,
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Command::Serve { host, port, strict } => {
                cmd_serve(host.clone(), *port, *strict).await
            }
            Command::Config => cmd_config().await,
        }
    }
}

// Command implementations

fn resolve_settings(host: Option<String>, port: Option<u16>, strict: bool) -> Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(host) = host {
        settings.host = host;
    }
    if let Some(port) = port {
        settings.port = port;
    }
    if strict {
        settings.validation = ValidationMode::Strict;
    }
    Ok(settings)
}

async fn cmd_serve(host: Option<String>, port: Option<u16>, strict: bool) -> Result<()> {
    let settings = resolve_settings(host, port, strict)?;
    crate::web::run_server(settings).await?;
    Ok(())
}

async fn cmd_config() -> Result<()> {
    let settings = Settings::from_env()?;
    println!("host       = {}", settings.host);
    println!("port       = {}", settings.port);
    println!("validation = {}", settings.validation);
    Ok(())
}
