//! Netgate CLI - Command-line interface for the gateway manager's control plane

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use netgate_sdk::{ComponentStatus, NetgateClient, SdkError};
use tabled::{Table, Tabled};

const DEFAULT_URL: &str = "http://127.0.0.1:8318";

/// Components listed by `status`, in start order
const COMPONENTS: [&str; 6] = ["wifi", "dns", "scrambler", "proxy", "lan", "shortcut"];

#[derive(Parser)]
#[command(name = "netgate")]
#[command(about = "Gateway manager control CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control plane URL
    #[arg(long, env = "NETGATE_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the manager is alive
    Ping,

    /// Start the free-internet bundle
    Connect,

    /// Stop the free-internet bundle
    Disconnect,

    /// Show free-internet state and per-component status
    Status,
}

#[derive(Tabled)]
struct ComponentRow {
    component: &'static str,
    status: String,
}

async fn component_row(client: &NetgateClient, name: &'static str) -> ComponentRow {
    let status = match client.component_status(name).await {
        Ok(ComponentStatus::Running) => "RUNNING".to_string(),
        Ok(ComponentStatus::Stopped) => "STOPPED".to_string(),
        // No status route until the component has started once
        Err(SdkError::Http { status: 404, .. }) => "NOT STARTED".to_string(),
        Err(e) => format!("ERROR ({})", e),
    };
    ComponentRow {
        component: name,
        status,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = NetgateClient::connect(&cli.url).context("Invalid control plane URL")?;

    match cli.command {
        Commands::Ping => {
            let reply = client
                .ping()
                .await
                .context("Failed to reach gateway manager")?;
            println!("{}", reply);
        }

        Commands::Connect => {
            client
                .connect_free_internet()
                .await
                .context("connect request failed")?;
            println!("{}", "✓ Free internet connect requested".green().bold());
        }

        Commands::Disconnect => {
            client
                .disconnect_free_internet()
                .await
                .context("disconnect request failed")?;
            println!("{}", "✓ Free internet disconnected".green().bold());
        }

        Commands::Status => {
            println!("{}", "Gateway Status".cyan().bold());
            println!();

            match client.is_free_internet_connected().await {
                Ok(connected) => {
                    println!("  {} {}", "URL:".bold(), cli.url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    let state = if connected {
                        "CONNECTED".green()
                    } else {
                        "DISCONNECTED".yellow()
                    };
                    println!("  {} {}", "Free internet:".bold(), state);
                    println!();

                    let mut rows = Vec::with_capacity(COMPONENTS.len());
                    for name in COMPONENTS {
                        rows.push(component_row(&client, name).await);
                    }
                    println!("{}", Table::new(rows));
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
