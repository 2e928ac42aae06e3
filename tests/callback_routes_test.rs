//! HTTP-level tests for the callback landing routes
//!
//! The verifier is a stub so no backend is needed.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use payment_callback::api::{router, AppState};
use payment_callback::callback::{CallbackReconciler, PaymentEvents, ReconcilerPolicy};
use payment_callback::config::{CallbackConfig, Config, ServerConfig};
use payment_callback::error::{AppResult, ExternalError};
use payment_callback::payments::providers::BackendVerifierConfig;
use payment_callback::payments::{PaymentVerifier, VerificationRequest, VerificationResponse};
use payment_callback::session::SessionContext;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingVerifier {
    fail_with: Option<String>,
    calls: Mutex<Vec<(Option<String>, VerificationRequest)>>,
}

#[async_trait]
impl PaymentVerifier for RecordingVerifier {
    async fn verify_callback(
        &self,
        session: &SessionContext,
        request: VerificationRequest,
    ) -> AppResult<VerificationResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((session.token().map(str::to_string), request));

        match &self.fail_with {
            Some(message) => Err(ExternalError::Network {
                message: message.clone(),
            }
            .into()),
            None => Ok(VerificationResponse {
                success: true,
                amount: Some(5000.0),
                course_name: Some("Intro".to_string()),
                ..Default::default()
            }),
        }
    }
}

fn test_config(environment: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: environment.to_string(),
        },
        verifier: BackendVerifierConfig::default(),
        callback: CallbackConfig::default(),
    }
}

fn test_app(verifier: Arc<RecordingVerifier>, environment: &str) -> Router {
    let config = test_config(environment);
    let events = PaymentEvents::new(8);
    let reconciler = CallbackReconciler::new(verifier, config.callback.policy())
        .with_events(events.clone());
    router(AppState::new(config, reconciler, events))
}

async fn get_json(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_direct_success_callback() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (status, body) = get_json(
        test_app(verifier.clone(), "production"),
        "/payment/callback?transaction_id=T1&payment_reference=R1&status=successful",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["headline"], "Payment Successful!");
    assert_eq!(body["details"]["transactionId"], "T1");
    assert_eq!(body["details"]["reference"], "R1");
    assert_eq!(body["details"]["status"], "successful");
    assert_eq!(body["details"]["provenance"], "direct");
    assert_eq!(body["actions"][0]["path"], "/student/dashboard");
    assert!(body.get("debug").is_none());
    assert!(verifier.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_direct_failure_callback() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (_, body) = get_json(
        test_app(verifier.clone(), "production"),
        "/callback?transaction_id=T2&payment_reference=R2&status=failed",
        None,
    )
    .await;

    assert_eq!(body["state"], "failed");
    assert!(body["message"].as_str().unwrap().contains("failed"));
    assert_eq!(body["actions"][2]["path"], "/contact");
    assert!(verifier.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_relay_error_is_decoded() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (_, body) = get_json(
        test_app(verifier, "production"),
        "/payment/callback?error=Card%20declined&transaction_id=T1&payment_reference=R1",
        None,
    )
    .await;

    assert_eq!(body["state"], "error");
    assert_eq!(body["message"], "Card declined");
    assert_eq!(body["icon"], "x-circle");
}

#[tokio::test]
async fn test_missing_identifiers_callback() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (status, body) = get_json(
        test_app(verifier, "production"),
        "/payment/callback?status=successful",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "error");
    assert_eq!(
        body["message"],
        "Invalid payment callback parameters. Missing transaction details."
    );
}

#[tokio::test]
async fn test_indeterminate_callback_is_verified_with_session() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (_, body) = get_json(
        test_app(verifier.clone(), "production"),
        "/api/public/payments/callback?transaction_id=T3&payment_reference=R3",
        Some("student-token"),
    )
    .await;

    assert_eq!(body["state"], "success");
    assert_eq!(body["details"]["amount"], 5000.0);
    assert_eq!(body["details"]["courseName"], "Intro");
    assert_eq!(body["details"]["provenance"], "verified");

    let calls = verifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.as_deref(), Some("student-token"));
    assert_eq!(calls[0].1.transaction_id, "T3");
    assert_eq!(calls[0].1.payment_reference, "R3");
    assert_eq!(calls[0].1.status, None);
}

#[tokio::test]
async fn test_verification_outage_with_pending_status() {
    let verifier = Arc::new(RecordingVerifier {
        fail_with: Some("connection refused".to_string()),
        ..Default::default()
    });
    let (_, body) = get_json(
        test_app(verifier, "production"),
        "/payment/callback?transaction_id=T5&payment_reference=R5&status=pending",
        None,
    )
    .await;

    assert_eq!(body["state"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_development_view_carries_debug() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (_, body) = get_json(
        test_app(verifier, "development"),
        "/payment/callback?tx_ref=IGA-7&status=completed&extra=1",
        None,
    )
    .await;

    assert_eq!(body["state"], "success");
    assert_eq!(body["debug"]["transactionId"], "IGA-7");
    assert_eq!(body["debug"]["paymentReference"], "IGA-7");
    assert_eq!(body["debug"]["allParams"]["extra"], "1");
    assert_eq!(
        body["debug"]["url"],
        "/payment/callback?tx_ref=IGA-7&status=completed&extra=1"
    );
}

#[tokio::test]
async fn test_backend_relay_redirects_to_callback() {
    let verifier = Arc::new(RecordingVerifier::default());
    let response = test_app(verifier, "production")
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/payment/backend-callback?status=successful&tx_ref=IGA-9&transaction_id=55&hash=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/payment/callback?status=successful&tx_ref=IGA-9&transaction_id=55"
    );
}

#[tokio::test]
async fn test_untrusted_policy_falls_back_on_outage() {
    let verifier = Arc::new(RecordingVerifier {
        fail_with: Some("timeout".to_string()),
        ..Default::default()
    });
    let mut config = test_config("production");
    config.callback.trust_gateway_status = false;
    let policy: ReconcilerPolicy = config.callback.policy();
    let events = PaymentEvents::new(8);
    let app = router(AppState::new(
        config,
        CallbackReconciler::new(verifier.clone(), policy),
        events,
    ));

    let (_, body) = get_json(
        app,
        "/payment/callback?transaction_id=T4&payment_reference=R4&status=success",
        None,
    )
    .await;

    assert_eq!(body["state"], "success");
    assert_eq!(body["details"]["provenance"], "fallback_success");
    assert!(body["message"].as_str().unwrap().contains("Verification"));
    assert_eq!(verifier.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_reports_policy() {
    let verifier = Arc::new(RecordingVerifier::default());
    let (status, body) = get_json(test_app(verifier, "staging"), "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["trust_gateway_status"], true);
    assert_eq!(
        body["verification_endpoint"],
        "http://localhost:5000/api/v1/student/payments/course/verify"
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let verifier = Arc::new(RecordingVerifier::default());
    let response = test_app(verifier, "production")
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
