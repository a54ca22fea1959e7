use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iqhook_core::client::IqClient;
use secrecy::SecretString;

mod commands;

use commands::{
    send::{SendArgs, handle_send_command},
    server::{check_health, get_stats, get_version},
};

#[derive(Parser)]
#[command(name = "iqhook")]
#[command(version = iqhook_core::VERSION)]
#[command(about = "CLI for the iqhook webhook receiver", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "IQHOOK_SERVER", global = true, default_value = "http://localhost:8080")]
    server: String,

    /// Username for basic auth in front of the server
    #[arg(long, env = "IQHOOK_USERNAME", global = true)]
    username: Option<String>,

    /// Password for basic auth in front of the server
    #[arg(long, env = "IQHOOK_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if the server is running
    Health,

    /// Show CLI and server version
    Version,

    /// Show live subscriber counts per event kind
    Stats,

    /// Post a webhook to the server as Nexus IQ would
    Send(SendArgs),
}

fn build_client(cli: &Cli) -> Result<IqClient> {
    let client = IqClient::new(&cli.server)
        .context("Invalid server URL")?
        .with_header("User-Agent", format!("iqhook-cli/{}", iqhook_core::VERSION));

    Ok(match (&cli.username, &cli.password) {
        (Some(username), password) => client.with_credentials(
            username.clone(),
            SecretString::from(password.clone().unwrap_or_default()),
        ),
        (None, Some(_)) => {
            tracing::warn!("--password given without --username, ignoring");
            client
        }
        (None, None) => client,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli)?;

    match cli.command {
        Commands::Health => check_health(&client).await?,
        Commands::Version => get_version(&client).await?,
        Commands::Stats => get_stats(&client).await?,
        Commands::Send(args) => handle_send_command(&client, args).await?,
    }

    Ok(())
}
