//! Posting webhooks the way a Nexus IQ server does.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use iqhook_core::{
    client::IqClient,
    crypto::hmac_sha1_hex,
    models::EventKind,
    webhook::{SIGNATURE_HEADER, USER_AGENT_HEADER, WEBHOOK_ID_HEADER, parse_iq_webhook, samples::sample_payload},
};
use reqwest::Method;
use serde_json::Value;

/// User-Agent sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Sonatype_CLM_Server/iqhook-cli";

#[derive(Args)]
pub struct SendArgs {
    /// Event kind wire id, e.g. iq:policyAlert
    pub kind: EventKind,

    /// JSON payload to send instead of the built-in sample
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Sign the body with this secret
    #[arg(long, env = "IQHOOK_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

/// Reads the payload file, or serializes the sample for `kind`.
fn load_body(kind: EventKind, file: Option<&PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let body = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            // Catch typos before the server does
            if let Err(e) = parse_iq_webhook(kind.as_str(), &body) {
                tracing::warn!("{} does not decode locally: {}", path.display(), e);
            }
            Ok(body)
        }
        None => sample_payload(kind)
            .to_json()
            .context("Failed to serialize sample payload"),
    }
}

/// Headers a Nexus IQ server attaches to a webhook delivery.
fn webhook_headers(kind: EventKind, body: &[u8], user_agent: &str, secret: Option<&str>) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        (WEBHOOK_ID_HEADER, kind.as_str().to_string()),
        (USER_AGENT_HEADER, user_agent.to_string()),
    ];
    if let Some(secret) = secret {
        headers.push((SIGNATURE_HEADER, hmac_sha1_hex(secret.as_bytes(), body)));
    }
    headers
}

pub async fn handle_send_command(client: &IqClient, args: SendArgs) -> Result<()> {
    let body = load_body(args.kind, args.file.as_ref())?;
    let headers = webhook_headers(args.kind, &body, &args.user_agent, args.secret.as_deref());
    let header_refs: Vec<(&str, &str)> = headers.iter().map(|(n, v)| (*n, v.as_str())).collect();

    let response = client
        .request_with_headers(Method::POST, "/api/webhooks/iq", Some(body), &header_refs)
        .await
        .context("Failed to connect to server")?;

    let rendered = match serde_json::from_slice::<Value>(&response.body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => response.text(),
    };

    if !response.is_success() {
        anyhow::bail!("Webhook rejected ({}): {}", response.status, rendered);
    }

    println!("Sent {} webhook ({})", args.kind, response.status);
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iqhook_core::crypto::verify_iq_signature;

    #[test]
    fn test_sample_body_decodes_for_every_kind() {
        for kind in EventKind::ALL {
            let body = load_body(kind, None).unwrap();
            let decoded = parse_iq_webhook(kind.as_str(), &body).unwrap();
            assert_eq!(decoded, sample_payload(kind));
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/iqhook/payload.json");
        let err = load_body(EventKind::ViolationAlert, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("payload.json"));
    }

    #[test]
    fn test_headers_without_secret() {
        let headers = webhook_headers(EventKind::PolicyManagement, b"{}", DEFAULT_USER_AGENT, None);

        assert_eq!(
            headers,
            vec![
                (WEBHOOK_ID_HEADER, "iq:policyManagement".to_string()),
                (USER_AGENT_HEADER, DEFAULT_USER_AGENT.to_string()),
            ]
        );
    }

    #[test]
    fn test_headers_with_secret_are_signed() {
        let body = br#"{"initiator":"admin"}"#;
        let headers = webhook_headers(EventKind::ApplicationEvaluation, body, "ua", Some("s3cret"));

        let (name, signature) = &headers[2];
        assert_eq!(*name, SIGNATURE_HEADER);
        assert!(verify_iq_signature("s3cret", signature, body));
        assert!(!verify_iq_signature("other", signature, body));
    }
}
