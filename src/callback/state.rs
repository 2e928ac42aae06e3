//! Reconciliation states and results

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

pub const PROCESSING_MESSAGE: &str = "Processing your payment...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationState {
    Processing,
    Success,
    Failed,
    Error,
}

impl ReconciliationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReconciliationState::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationState::Processing => "processing",
            ReconciliationState::Success => "success",
            ReconciliationState::Failed => "failed",
            ReconciliationState::Error => "error",
        }
    }
}

impl std::fmt::Display for ReconciliationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which decision path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Gateway status in the redirect was taken at face value
    Direct,
    /// Backend verification confirmed the payment
    Verified,
    /// Verification failed but the gateway reported success
    FallbackSuccess,
}

/// Receipt data shown next to a result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub transaction_id: Option<String>,
    pub payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<String>,
    pub status: Option<String>,
    pub provenance: Option<Provenance>,
}

impl PaymentDetails {
    /// Details built purely from the redirect parameters
    pub fn from_callback(
        transaction_id: &str,
        payment_reference: &str,
        status: Option<&str>,
        provenance: Provenance,
    ) -> Self {
        Self {
            transaction_id: Some(transaction_id.to_string()),
            payment_reference: Some(payment_reference.to_string()),
            status: status.map(str::to_string),
            provenance: Some(provenance),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub state: ReconciliationState,
    pub message: String,
    pub details: Option<PaymentDetails>,
}

impl ReconciliationResult {
    pub fn processing() -> Self {
        Self {
            state: ReconciliationState::Processing,
            message: PROCESSING_MESSAGE.to_string(),
            details: None,
        }
    }

    pub fn success(message: impl Into<String>, details: PaymentDetails) -> Self {
        Self {
            state: ReconciliationState::Success,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn failed(message: impl Into<String>, details: Option<PaymentDetails>) -> Self {
        Self {
            state: ReconciliationState::Failed,
            message: message.into(),
            details,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: ReconciliationState::Error,
            message: message.into(),
            details: None,
        }
    }

    pub fn provenance(&self) -> Option<Provenance> {
        self.details.as_ref().and_then(|d| d.provenance)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("reconciliation already finished in state {state}")]
    AlreadyTerminal { state: ReconciliationState },

    #[error("cannot finish reconciliation with non-terminal state {state}")]
    NotTerminal { state: ReconciliationState },
}

/// Observable state of one reconciliation
///
/// Starts in `processing`; the message may change while processing, and
/// exactly one terminal transition is accepted.
#[derive(Debug)]
pub struct ReconciliationTracker {
    tx: watch::Sender<ReconciliationResult>,
}

impl Default for ReconciliationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReconciliationResult::processing());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReconciliationResult> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ReconciliationResult {
        self.tx.borrow().clone()
    }

    pub fn set_message(&self, message: impl Into<String>) -> Result<(), TransitionError> {
        let state = self.tx.borrow().state;
        if state.is_terminal() {
            return Err(TransitionError::AlreadyTerminal { state });
        }

        let message = message.into();
        self.tx.send_modify(|current| current.message = message);
        Ok(())
    }

    pub fn finish(
        &self,
        result: ReconciliationResult,
    ) -> Result<ReconciliationResult, TransitionError> {
        if !result.state.is_terminal() {
            return Err(TransitionError::NotTerminal {
                state: result.state,
            });
        }

        let state = self.tx.borrow().state;
        if state.is_terminal() {
            return Err(TransitionError::AlreadyTerminal { state });
        }

        self.tx.send_replace(result.clone());
        Ok(result)
    }
}
