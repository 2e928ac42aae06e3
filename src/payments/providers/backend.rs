//! Backend verification client
//!
//! Posts the callback identifiers to the platform's REST API, which owns
//! enrollment creation and the payment ledger. One request per callback;
//! this client never retries.

use crate::error::{AppError, AppResult, ExternalError, InfrastructureError};
use crate::payments::traits::PaymentVerifier;
use crate::payments::types::{VerificationRequest, VerificationResponse};
use crate::session::SessionContext;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, warn};

const PROVIDER: &str = "Backend";

/// Backend verifier configuration
#[derive(Debug, Clone)]
pub struct BackendVerifierConfig {
    /// REST API base URL, e.g. `http://localhost:5000/api/v1`
    pub base_url: String,
    /// Path of the verification endpoint, appended to `base_url`
    pub verify_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendVerifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/v1".to_string(),
            verify_path: "/student/payments/course/verify".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendVerifierConfig {
    /// Create config from environment variables
    pub fn from_env() -> AppResult<Self> {
        let base_url = std::env::var("API_BASE_URL")
            .map_err(|_| AppError::configuration("API_BASE_URL environment variable is required"))?;

        let verify_path = std::env::var("PAYMENT_VERIFY_PATH")
            .unwrap_or_else(|_| "/student/payments/course/verify".to_string());

        let timeout_secs = std::env::var("PAYMENT_VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            base_url,
            verify_path,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.verify_path)
    }
}

/// Verifier backed by the platform REST API
pub struct BackendVerifier {
    config: BackendVerifierConfig,
    client: Client,
}

impl BackendVerifier {
    pub fn new(config: BackendVerifierConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("payment-callback/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::from(InfrastructureError::HttpClient {
                    message: format!("Failed to create HTTP client: {}", e),
                })
            })?;

        info!(
            "Backend verifier initialized with endpoint: {}",
            config.endpoint()
        );

        Ok(Self { config, client })
    }

    fn request_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            ExternalError::Timeout {
                service: "Payment verification".to_string(),
                seconds: self.config.timeout_secs,
            }
            .into()
        } else {
            AppError::from(err)
        }
    }
}

#[async_trait]
impl PaymentVerifier for BackendVerifier {
    async fn verify_callback(
        &self,
        session: &SessionContext,
        request: VerificationRequest,
    ) -> AppResult<VerificationResponse> {
        info!(
            "Verifying payment callback: transaction_id={}, reference={}, status={:?}",
            request.transaction_id, request.payment_reference, request.status
        );

        let mut builder = self.client.post(self.config.endpoint()).json(&request);
        if let Some(token) = session.token() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Verification request failed: {}", e);
            self.request_error(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if status.is_success() {
            let parsed = serde_json::from_str::<VerificationResponse>(&body).map_err(|e| {
                error!("Failed to parse verification response: {}", e);
                AppError::from(ExternalError::PaymentProvider {
                    provider: PROVIDER.to_string(),
                    message: format!("Invalid response format: {}", e),
                    is_retryable: false,
                })
            })?;

            info!(
                "Verification answered: reference={}, success={}",
                request.payment_reference, parsed.success
            );
            return Ok(parsed);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}: {}", status, body));

        warn!(
            "Verification rejected: reference={}, http_status={}, message={}",
            request.payment_reference, status, message
        );

        Err(ExternalError::PaymentProvider {
            provider: PROVIDER.to_string(),
            message,
            is_retryable: status.is_server_error(),
        }
        .into())
    }
}

// Error body shape used by the backend for non-2xx answers
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}
