//! Application state for the iqhook server.

use std::net::SocketAddr;
use std::sync::Arc;

use iqhook_core::crypto::MAX_WEBHOOK_SIZE;
use iqhook_core::fanout::SubscriptionRegistry;
use iqhook_core::models::EventKind;
use iqhook_core::{IqError, Result};
use secrecy::SecretString;

/// Server configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Secret key for `X-Nexus-Webhook-Signature` verification. Off when unset.
    pub webhook_secret: Option<SecretString>,
    /// Reject webhooks whose `User-Agent` is not an IQ server's.
    pub require_user_agent: bool,
    /// Maximum accepted webhook body size in bytes.
    pub max_body_bytes: usize,
    /// Kinds the built-in event logger subscribes to.
    pub log_events: Vec<EventKind>,
    /// Allowed CORS origin. Any origin when unset.
    pub dashboard_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            webhook_secret: None,
            require_user_agent: false,
            max_body_bytes: MAX_WEBHOOK_SIZE,
            log_events: EventKind::ALL.to_vec(),
            dashboard_origin: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = match std::env::var("IQHOOK_BIND_ADDR") {
            Ok(value) => value
                .parse::<SocketAddr>()
                .map_err(|e| IqError::Configuration(format!("Invalid IQHOOK_BIND_ADDR '{}': {}", value, e)))?,
            Err(_) => defaults.bind_addr,
        };

        let webhook_secret = std::env::var("IQHOOK_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let require_user_agent = match std::env::var("IQHOOK_REQUIRE_USER_AGENT") {
            Ok(value) => parse_bool("IQHOOK_REQUIRE_USER_AGENT", &value)?,
            Err(_) => defaults.require_user_agent,
        };

        let max_body_bytes = match std::env::var("IQHOOK_MAX_BODY_BYTES") {
            Ok(value) => match value.parse::<usize>() {
                Ok(0) => {
                    return Err(IqError::Configuration(
                        "IQHOOK_MAX_BODY_BYTES must be greater than zero".to_string(),
                    ));
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(IqError::Configuration(format!(
                        "Invalid IQHOOK_MAX_BODY_BYTES '{}': {}",
                        value, e
                    )));
                }
            },
            Err(_) => defaults.max_body_bytes,
        };

        let log_events = match std::env::var("IQHOOK_LOG_EVENTS") {
            Ok(value) => parse_event_list(&value)?,
            Err(_) => defaults.log_events,
        };

        Ok(Self {
            bind_addr,
            webhook_secret,
            require_user_agent,
            max_body_bytes,
            log_events,
            dashboard_origin: std::env::var("IQHOOK_DASHBOARD_ORIGIN").ok(),
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(IqError::Configuration(format!(
            "Invalid {} '{}': expected true or false",
            name, other
        ))),
    }
}

/// Parses a comma-separated list of wire identifiers, or `all` / `none`.
fn parse_event_list(value: &str) -> Result<Vec<EventKind>> {
    match value.trim() {
        "" | "all" => return Ok(EventKind::ALL.to_vec()),
        "none" => return Ok(Vec::new()),
        _ => {}
    }

    let mut kinds = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = item
            .parse::<EventKind>()
            .map_err(|e| IqError::Configuration(format!("Invalid IQHOOK_LOG_EVENTS: {}", e)))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Subscribers to decoded webhook events.
    pub registry: SubscriptionRegistry,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ServerConfig, registry: SubscriptionRegistry) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const VARS: [&str; 6] = [
        "IQHOOK_BIND_ADDR",
        "IQHOOK_WEBHOOK_SECRET",
        "IQHOOK_REQUIRE_USER_AGENT",
        "IQHOOK_MAX_BODY_BYTES",
        "IQHOOK_LOG_EVENTS",
        "IQHOOK_DASHBOARD_ORIGIN",
    ];

    #[test]
    fn test_defaults_without_env() {
        temp_env::with_vars_unset(VARS, || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
            assert!(config.webhook_secret.is_none());
            assert!(!config.require_user_agent);
            assert_eq!(config.max_body_bytes, MAX_WEBHOOK_SIZE);
            assert_eq!(config.log_events, EventKind::ALL.to_vec());
            assert!(config.dashboard_origin.is_none());
        });
    }

    #[test]
    fn test_overrides_from_env() {
        temp_env::with_vars(
            [
                ("IQHOOK_BIND_ADDR", Some("127.0.0.1:9090")),
                ("IQHOOK_WEBHOOK_SECRET", Some("s3cret")),
                ("IQHOOK_REQUIRE_USER_AGENT", Some("true")),
                ("IQHOOK_MAX_BODY_BYTES", Some("4096")),
                ("IQHOOK_LOG_EVENTS", Some("iq:policyAlert, iq:policyManagement,iq:policyAlert")),
                ("IQHOOK_DASHBOARD_ORIGIN", Some("https://dash.example.com")),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9090");
                assert_eq!(config.webhook_secret.unwrap().expose_secret(), "s3cret");
                assert!(config.require_user_agent);
                assert_eq!(config.max_body_bytes, 4096);
                assert_eq!(
                    config.log_events,
                    vec![EventKind::ViolationAlert, EventKind::PolicyManagement]
                );
                assert_eq!(config.dashboard_origin.as_deref(), Some("https://dash.example.com"));
            },
        );
    }

    /// Runs `f` with every config variable unset except `name`.
    fn with_only(name: &str, value: &str, f: impl FnOnce()) {
        let vars: Vec<(&str, Option<&str>)> = VARS
            .iter()
            .map(|var| (*var, (*var == name).then_some(value)))
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        with_only("IQHOOK_BIND_ADDR", "not-an-address", || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(matches!(err, IqError::Configuration(_)));
            assert!(err.to_string().contains("IQHOOK_BIND_ADDR"));
        });
        with_only("IQHOOK_REQUIRE_USER_AGENT", "maybe", || {
            assert!(ServerConfig::from_env().is_err());
        });
        with_only("IQHOOK_MAX_BODY_BYTES", "0", || {
            assert!(ServerConfig::from_env().is_err());
        });
        with_only("IQHOOK_LOG_EVENTS", "iq:unknown", || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("iq:unknown"));
        });
    }

    #[test]
    fn test_empty_secret_disables_verification() {
        with_only("IQHOOK_WEBHOOK_SECRET", "", || {
            assert!(ServerConfig::from_env().unwrap().webhook_secret.is_none());
        });
    }

    #[test]
    fn test_parse_event_list_keywords() {
        assert_eq!(parse_event_list("none").unwrap(), Vec::<EventKind>::new());
        assert_eq!(parse_event_list("all").unwrap().len(), EventKind::ALL.len());
    }
}
