//! Verification request and response bodies
//!
//! Field names follow the backend's camelCase JSON.

use serde::{Deserialize, Serialize};

/// Body of the verification call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Gateway-assigned transaction identifier
    pub transaction_id: String,
    /// Merchant-side payment reference
    pub payment_reference: String,
    /// Status reported by the gateway redirect, when there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Backend answer to a verification call
///
/// Only `success` drives reconciliation; the rest is display data for the
/// receipt panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub enrollment_id: Option<String>,
    #[serde(default)]
    pub enrollment_status: Option<String>,
    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
