//! End-to-end tests for the relay
//!
//! Outbound calls go to a throwaway local HTTP server standing in for the
//! Bitbucket API, so no network access is needed.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use build_status_relay::bitbucket::{BitbucketClient, CommitState, DeliveryError};
use build_status_relay::cloudbuild::PubSubMessage;
use build_status_relay::config::BitbucketConfig;
use build_status_relay::relay::Translator;

/// A request captured by the stub Bitbucket server
#[derive(Debug, Clone)]
struct CapturedRequest {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct StubBitbucket {
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    reply: StatusCode,
}

async fn capture(
    State(stub): State<StubBitbucket>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let request = CapturedRequest {
        method,
        path: uri.path().to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    stub.captured.lock().unwrap().push(request);

    let body = if stub.reply.is_success() {
        r#"{"state":"ok"}"#
    } else {
        r#"{"type":"error","error":{"message":"Unauthorized"}}"#
    };
    (stub.reply, body)
}

/// Start a stub server; returns its address and the captured requests
async fn start_stub(reply: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<CapturedRequest>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = StubBitbucket {
        captured: captured.clone(),
        reply,
    };
    let app = Router::new().fallback(capture).with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, captured)
}

fn client_config(addr: SocketAddr) -> BitbucketConfig {
    BitbucketConfig {
        base_url: format!("http://{}/2.0/repositories", addr),
        user: "ci-bot".to_string(),
        app_password: "app-pass".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn translator_for(config: BitbucketConfig) -> Translator {
    let status_name = config.status_name.clone();
    let client = BitbucketClient::new(config).unwrap();
    Translator::new(Arc::new(client), status_name)
}

fn widgets_build(status: &str) -> PubSubMessage {
    let event = json!({
        "id": "build-1",
        "status": status,
        "createTime": "2024-03-01T10:00:00Z",
        "finishTime": "2024-03-01T10:04:12Z",
        "logUrl": "https://console.cloud.google.com/cloud-build/builds/build-1",
        "buildTriggerId": "trigger-9",
        "sourceProvenance": {
            "resolvedRepoSource": {
                "repoName": "bitbucket_acme_widgets",
                "commitSha": "deadbeef"
            }
        }
    });
    PubSubMessage::from_event_json(&event.to_string())
}

// =============================================================================
// Delivery Tests
// =============================================================================

mod delivery_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_build_posts_one_status() {
        let (addr, captured) = start_stub(StatusCode::CREATED).await;
        let translator = translator_for(client_config(addr));

        let report = translator
            .translate_and_send(&widgets_build("SUCCESS"))
            .await
            .unwrap();

        assert!(report.is_delivered());
        assert_eq!(report.delivery.as_ref().unwrap().status, 201);

        let requests = captured.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.path,
            "/2.0/repositories/acme/widgets/commit/deadbeef/statuses/build"
        );
        assert_eq!(request.body["state"], "SUCCESSFUL");
        assert_eq!(request.body["uuid"], "build-1");
        assert_eq!(request.body["name"], "Google Cloud Build");
        assert_eq!(request.body["refname"], "buildTriggerId: trigger-9");
        assert_eq!(request.body["description"], "Status: SUCCESS");
    }

    #[tokio::test]
    async fn test_request_uses_basic_auth() {
        let (addr, captured) = start_stub(StatusCode::CREATED).await;
        let translator = translator_for(client_config(addr));

        translator
            .translate_and_send(&widgets_build("WORKING"))
            .await
            .unwrap();

        let requests = captured.lock().unwrap().clone();
        let expected = format!("Basic {}", BASE64.encode("ci-bot:app-pass"));
        assert_eq!(requests[0].authorization.as_deref(), Some(expected.as_str()));
        assert_eq!(requests[0].body["state"], "INPROGRESS");
    }

    #[tokio::test]
    async fn test_rejected_status_is_reported() {
        let (addr, captured) = start_stub(StatusCode::UNAUTHORIZED).await;
        let translator = translator_for(client_config(addr));

        let report = translator
            .translate_and_send(&widgets_build("FAILURE"))
            .await
            .unwrap();

        assert!(!report.is_delivered());
        match &report.delivery {
            Err(DeliveryError::Rejected { status, body }) => {
                assert_eq!(*status, 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("Expected rejection, got {:?}", other),
        }

        let summary = report.summary();
        assert_eq!(summary.provider_status, Some(401));
        assert_eq!(summary.state, CommitState::Failed);

        // No retries
        assert_eq!(captured.lock().unwrap().len(), 1);
        assert_eq!(translator.stats().deliveries_failed, 1);
    }

    #[tokio::test]
    async fn test_network_failure_does_not_raise() {
        // Reserve a port, then close it so the connection is refused
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let translator = translator_for(client_config(addr));
        let result = translator.translate_and_send(&widgets_build("SUCCESS")).await;

        let report = tokio_test::assert_ok!(result);
        assert!(matches!(report.delivery, Err(DeliveryError::Transport(_))));
        assert!(!report.summary().delivered);
    }

    #[tokio::test]
    async fn test_malformed_repo_name_sends_nothing() {
        let (addr, captured) = start_stub(StatusCode::CREATED).await;
        let translator = translator_for(client_config(addr));

        let event = json!({
            "id": "build-2",
            "status": "SUCCESS",
            "sourceProvenance": {
                "resolvedRepoSource": {"repoName": "onlyoneword", "commitSha": "abc123"}
            }
        });
        let message = PubSubMessage::from_event_json(&event.to_string());

        tokio_test::assert_err!(translator.translate_and_send(&message).await);
        assert!(captured.lock().unwrap().is_empty());
    }
}
