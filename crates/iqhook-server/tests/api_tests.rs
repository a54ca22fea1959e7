//! API integration tests for iqhook-server.
//!
//! These tests drive the full router, including the CORS and trace layers.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use iqhook_core::models::{EventKind, EventPayload};
use iqhook_server::ServerConfig;
use iqhook_server::test_utils::{
    IQ_USER_AGENT, create_test_app_with_config, create_test_app_with_state, sample_body, sign, test_config,
    test_config_with_secret,
};
use serde_json::Value;

/// Helper to create a test server.
fn create_server() -> TestServer {
    let (app, _state) = create_test_app_with_state();
    TestServer::new(app).expect("Failed to create test server")
}

/// Posts `body` as an IQ webhook of the given id.
async fn post_webhook(server: &TestServer, webhook_id: &str, body: Vec<u8>) -> axum_test::TestResponse {
    server
        .post("/api/webhooks/iq")
        .add_header("X-Nexus-Webhook-Id", webhook_id)
        .add_header("User-Agent", IQ_USER_AGENT)
        .add_header("Content-Type", "application/json")
        .bytes(Bytes::from(body))
        .await
}

// =============================================================================
// Health & Version Tests
// =============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn health_check_returns_ok() {
        let server = create_server();

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn version_returns_server_info() {
        let server = create_server();

        let response = server.get("/api/version").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "iqhookd");
        assert_eq!(body["version"], iqhook_core::VERSION);
    }
}

// =============================================================================
// Webhook Ingest Tests
// =============================================================================

mod ingest {
    use super::*;

    #[tokio::test]
    async fn accepts_every_supported_kind() {
        let server = create_server();

        for kind in EventKind::ALL {
            let response = post_webhook(&server, kind.as_str(), sample_body(kind)).await;

            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "accepted");
            assert_eq!(body["kind"], kind.as_str());
            assert_eq!(body["delivered"], 0);
        }
    }

    #[tokio::test]
    async fn missing_webhook_id_is_rejected() {
        let server = create_server();

        let response = server
            .post("/api/webhooks/iq")
            .add_header("User-Agent", IQ_USER_AGENT)
            .bytes(Bytes::from(sample_body(EventKind::ViolationAlert)))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Request is not a Nexus IQ webhook");
    }

    #[tokio::test]
    async fn unknown_webhook_id_is_rejected() {
        let server = create_server();

        let response = post_webhook(&server, "iq:somethingNew", b"{}".to_vec()).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("iq:somethingNew"));
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let server = create_server();

        let response = post_webhook(&server, "iq:policyAlert", b"{not json".to_vec()).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("iq:policyAlert"));
    }

    #[tokio::test]
    async fn payload_of_wrong_shape_is_rejected() {
        let server = create_server();

        // A license override body announced as a policy alert
        let response = post_webhook(
            &server,
            "iq:policyAlert",
            sample_body(EventKind::LicenseOverride),
        )
        .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = ServerConfig {
            max_body_bytes: 64,
            ..test_config()
        };
        let (app, _state) = create_test_app_with_config(config);
        let server = TestServer::new(app).unwrap();

        let response = post_webhook(&server, "iq:policyAlert", sample_body(EventKind::ViolationAlert)).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().starts_with("Failed to read request body"));
    }

    #[tokio::test]
    async fn header_names_are_case_insensitive() {
        let server = create_server();

        let response = server
            .post("/api/webhooks/iq")
            .add_header("x-nexus-webhook-id", "iq:policyManagement")
            .add_header("user-agent", IQ_USER_AGENT)
            .bytes(Bytes::from(sample_body(EventKind::PolicyManagement)))
            .await;

        response.assert_status_ok();
    }
}

// =============================================================================
// Fan-out Tests
// =============================================================================

mod fanout {
    use super::*;

    #[tokio::test]
    async fn event_reaches_only_subscribers_of_its_kind() {
        let (app, state) = create_test_app_with_state();
        let server = TestServer::new(app).unwrap();

        let (mut alerts, _alerts_handle) = state.registry.subscribe(EventKind::ViolationAlert);
        let (mut evaluations, _evaluations_handle) = state.registry.subscribe(EventKind::ApplicationEvaluation);

        let response = post_webhook(&server, "iq:policyAlert", sample_body(EventKind::ViolationAlert)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["delivered"], 1);

        let event = alerts.try_recv().expect("policy alert subscriber got nothing");
        let EventPayload::ViolationAlert(alert) = event.as_ref() else {
            panic!("wrong payload variant");
        };
        assert_eq!(alert.application.public_id, "storefront");
        assert_eq!(alert.policy_alerts.len(), 2);
        assert_eq!(
            alert.highest_threat_policy().map(|p| p.policy_name.as_str()),
            Some("Security-High")
        );

        assert!(evaluations.try_recv().is_none());
    }

    #[tokio::test]
    async fn full_subscriber_drops_newest_event() {
        let (app, state) = create_test_app_with_state();
        let server = TestServer::new(app).unwrap();

        let (mut subscription, _handle) = state.registry.subscribe(EventKind::LicenseOverride);

        post_webhook(&server, "iq:licenseOverrideManagement", sample_body(EventKind::LicenseOverride))
            .await
            .assert_status_ok();

        // Second delivery finds the sink full and is still acknowledged
        let response = post_webhook(
            &server,
            "iq:licenseOverrideManagement",
            sample_body(EventKind::LicenseOverride),
        )
        .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["delivered"], 0);

        assert!(subscription.try_recv().is_some());
        assert!(subscription.try_recv().is_none());
    }

    #[tokio::test]
    async fn unsubscribed_consumer_receives_nothing() {
        let (app, state) = create_test_app_with_state();
        let server = TestServer::new(app).unwrap();

        let (mut subscription, handle) = state.registry.subscribe(EventKind::SecurityOverride);
        assert!(handle.unsubscribe());

        let response = post_webhook(
            &server,
            "iq:securityVulnerabilityOverrideManagement",
            sample_body(EventKind::SecurityOverride),
        )
        .await;

        response.assert_status_ok();
        assert!(subscription.try_recv().is_none());
    }

    #[tokio::test]
    async fn subscriptions_endpoint_reports_counts() {
        let (app, state) = create_test_app_with_state();
        let server = TestServer::new(app).unwrap();

        let _a = state.registry.subscribe(EventKind::ViolationAlert);
        let _b = state.registry.subscribe(EventKind::ViolationAlert);
        let _c = state.registry.subscribe(EventKind::PolicyManagement);

        let response = server.get("/api/webhooks/subscriptions").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["total"], 3);

        let kinds = body["kinds"].as_array().unwrap();
        let count_for = |wire: &str| {
            kinds
                .iter()
                .find(|k| k["kind"] == wire)
                .map(|k| k["subscribers"].as_u64().unwrap())
        };
        assert_eq!(count_for("iq:policyAlert"), Some(2));
        assert_eq!(count_for("iq:policyManagement"), Some(1));
    }
}

// =============================================================================
// Signature & User-Agent Tests
// =============================================================================

mod verification {
    use super::*;

    fn signed_server() -> TestServer {
        let (app, _state) = create_test_app_with_config(test_config_with_secret());
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn valid_signature_is_accepted() {
        let server = signed_server();
        let body = sample_body(EventKind::ApplicationEvaluation);
        let signature = sign(&body);

        let response = server
            .post("/api/webhooks/iq")
            .add_header("X-Nexus-Webhook-Id", "iq:applicationEvaluation")
            .add_header("X-Nexus-Webhook-Signature", signature)
            .add_header("User-Agent", IQ_USER_AGENT)
            .bytes(Bytes::from(body))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn wrong_signature_is_unauthorized() {
        let server = signed_server();
        let body = sample_body(EventKind::ApplicationEvaluation);
        let signature = sign(b"some other body");

        let response = server
            .post("/api/webhooks/iq")
            .add_header("X-Nexus-Webhook-Id", "iq:applicationEvaluation")
            .add_header("X-Nexus-Webhook-Signature", signature)
            .bytes(Bytes::from(body))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Webhook signature verification failed");
    }

    #[tokio::test]
    async fn missing_signature_is_unauthorized() {
        let server = signed_server();

        let response = post_webhook(
            &server,
            "iq:applicationEvaluation",
            sample_body(EventKind::ApplicationEvaluation),
        )
        .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signature_is_ignored_without_secret() {
        let server = create_server();

        let response = server
            .post("/api/webhooks/iq")
            .add_header("X-Nexus-Webhook-Id", "iq:applicationEvaluation")
            .add_header("X-Nexus-Webhook-Signature", "not-a-signature")
            .add_header("User-Agent", IQ_USER_AGENT)
            .bytes(Bytes::from(sample_body(EventKind::ApplicationEvaluation)))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn foreign_user_agent_is_accepted_by_default() {
        let server = create_server();

        let response = server
            .post("/api/webhooks/iq")
            .add_header("X-Nexus-Webhook-Id", "iq:policyAlert")
            .add_header("User-Agent", "curl/8.5.0")
            .bytes(Bytes::from(sample_body(EventKind::ViolationAlert)))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn foreign_user_agent_is_rejected_in_strict_mode() {
        let config = ServerConfig {
            require_user_agent: true,
            ..test_config()
        };
        let (app, _state) = create_test_app_with_config(config);
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/webhooks/iq")
            .add_header("X-Nexus-Webhook-Id", "iq:policyAlert")
            .add_header("User-Agent", "curl/8.5.0")
            .bytes(Bytes::from(sample_body(EventKind::ViolationAlert)))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Untrusted webhook user agent: curl/8.5.0");

        let response = post_webhook(&server, "iq:policyAlert", sample_body(EventKind::ViolationAlert)).await;
        response.assert_status_ok();
    }
}
