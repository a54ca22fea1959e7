use anyhow::{Context, Result};
use clap::Parser;
use iqhook_core::fanout::SubscriptionRegistry;
use iqhook_server::{AppState, ServerConfig, build_app, start_event_logger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

fn load_config() -> Result<ServerConfig> {
    ServerConfig::from_env().context("Invalid server configuration")
}

fn check_config() -> Result<()> {
    let config = load_config()?;

    let log_events: Vec<&str> = config.log_events.iter().map(|k| k.as_str()).collect();
    println!("Bind address:        {}", config.bind_addr);
    println!(
        "Signature check:     {}",
        if config.webhook_secret.is_some() { "enabled" } else { "disabled" }
    );
    println!(
        "User-Agent check:    {}",
        if config.require_user_agent { "enforced" } else { "advisory" }
    );
    println!("Max body size:       {} bytes", config.max_body_bytes);
    println!(
        "Logged events:       {}",
        if log_events.is_empty() { "none".to_string() } else { log_events.join(", ") }
    );
    println!(
        "Dashboard origin:    {}",
        config.dashboard_origin.as_deref().unwrap_or("any")
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn run() -> Result<()> {
    let config = load_config()?;
    let bind_addr = config.bind_addr;

    let registry = SubscriptionRegistry::new();
    let event_logger = start_event_logger(&registry, &config.log_events);
    if event_logger.is_empty() {
        tracing::info!("Event logging disabled");
    } else {
        tracing::info!("Event logger subscribed to {} kind(s)", event_logger.len());
    }
    if config.webhook_secret.is_none() {
        tracing::warn!("IQHOOK_WEBHOOK_SECRET not set, webhook signatures will not be verified");
    }

    let state = AppState::new(config, registry);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("iqhook server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    event_logger
        .shutdown()
        .await
        .context("Event logger did not shut down cleanly")?;
    tracing::info!("iqhook server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iqhook_server=debug,iqhook_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        Commands::Run => run().await,
        Commands::CheckConfig => check_config(),
    }
}
