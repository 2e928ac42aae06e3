use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub verification_endpoint: String,
    pub trust_gateway_status: bool,
    pub accept_unverified_success: bool,
    pub event_subscribers: usize,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let version = env!("CARGO_PKG_VERSION").to_string();
    let policy = state.reconciler.policy();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version,
        environment: state.config.server.environment.clone(),
        verification_endpoint: state.config.verifier.endpoint(),
        trust_gateway_status: policy.trust_gateway_status,
        accept_unverified_success: policy.accept_unverified_success,
        event_subscribers: state.events.subscriber_count(),
    };

    Ok(Json(response))
}
