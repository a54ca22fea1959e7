//! Server status commands.

use anyhow::{Context, Result};
use iqhook_core::client::{HttpClient, HttpResponse};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
    name: String,
}

#[derive(Deserialize)]
struct KindSubscriptions {
    kind: String,
    subscribers: usize,
}

#[derive(Deserialize)]
struct SubscriptionStatsResponse {
    total: usize,
    kinds: Vec<KindSubscriptions>,
}

fn parse<T: DeserializeOwned>(response: HttpResponse, what: &str) -> Result<T> {
    if !response.is_success() {
        anyhow::bail!("Failed to get {} ({}): {}", what, response.status, response.text());
    }
    response.json().context("Failed to parse response")
}

pub async fn check_health(client: &impl HttpClient) -> Result<()> {
    let response = client
        .get("/api/health")
        .await
        .context("Failed to connect to server")?;
    let health: HealthResponse = parse(response, "health")?;

    println!("Server status: {}", health.status);
    Ok(())
}

pub async fn get_version(client: &impl HttpClient) -> Result<()> {
    println!("CLI version: {}", iqhook_core::VERSION);

    match client.get("/api/version").await {
        Ok(response) => {
            let version: VersionResponse = parse(response, "version")?;
            println!("Server version: {} ({})", version.version, version.name);
        }
        Err(_) => {
            println!("Server: not reachable");
        }
    }

    Ok(())
}

/// Renders the per-kind table, or a single line when nothing is subscribed.
fn format_stats(stats: &SubscriptionStatsResponse) -> String {
    if stats.total == 0 {
        return "No active subscriptions.".to_string();
    }

    let mut lines = vec![
        format!("{:<48} {:>11}", "KIND", "SUBSCRIBERS"),
        "-".repeat(60),
    ];
    for kind in &stats.kinds {
        lines.push(format!("{:<48} {:>11}", kind.kind, kind.subscribers));
    }
    lines.push("-".repeat(60));
    lines.push(format!("{:<48} {:>11}", "TOTAL", stats.total));
    lines.join("\n")
}

pub async fn get_stats(client: &impl HttpClient) -> Result<()> {
    let response = client
        .get("/api/webhooks/subscriptions")
        .await
        .context("Failed to connect to server")?;
    let stats: SubscriptionStatsResponse = parse(response, "subscription stats")?;

    println!("{}", format_stats(&stats));
    Ok(())
}
