//! Payment callback reconciliation
//!
//! Turns the parameters of one gateway redirect into a terminal result:
//!
//! 1. a relay `error` parameter ends in `error`,
//! 2. missing identifiers end in `error`,
//! 3. a positive gateway status ends in `success` (when trusted),
//! 4. a negative gateway status ends in `failed` (when trusted),
//! 5. anything else is verified with the backend, once.
//!
//! When verification cannot be completed, a gateway-reported success is
//! still accepted if the policy allows it. That acceptance only affects
//! what the user is shown; enrollment and the ledger are updated by the
//! backend alone.

use crate::callback::events::{PaymentCompleted, PaymentEvents};
use crate::callback::params::{CallbackParameters, GatewayStatus};
use crate::callback::state::{
    PaymentDetails, Provenance, ReconciliationResult, ReconciliationTracker,
};
use crate::payments::traits::PaymentVerifier;
use crate::payments::types::{VerificationRequest, VerificationResponse};
use crate::session::SessionContext;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const VERIFYING_MESSAGE: &str = "Verifying payment with our servers...";
pub const MISSING_DETAILS_MESSAGE: &str =
    "Invalid payment callback parameters. Missing transaction details.";
pub const DIRECT_SUCCESS_MESSAGE: &str =
    "Payment completed successfully! You have been enrolled in the course.";
pub const VERIFIED_SUCCESS_MESSAGE: &str =
    "Payment verified successfully! You have been enrolled in the course.";
pub const FALLBACK_SUCCESS_MESSAGE: &str =
    "Payment completed! (Note: Verification with our servers failed, but payment was successful)";
pub const VERIFICATION_FAILED_MESSAGE: &str = "Payment verification failed";

/// Which redirect claims are believed without asking the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerPolicy {
    /// Settle on positive/negative gateway statuses without verification
    pub trust_gateway_status: bool,
    /// Show success when verification fails but the gateway said success
    pub accept_unverified_success: bool,
}

impl Default for ReconcilerPolicy {
    fn default() -> Self {
        Self {
            trust_gateway_status: true,
            accept_unverified_success: true,
        }
    }
}

pub struct CallbackReconciler {
    verifier: Arc<dyn PaymentVerifier>,
    policy: ReconcilerPolicy,
    events: Option<PaymentEvents>,
}

impl CallbackReconciler {
    pub fn new(verifier: Arc<dyn PaymentVerifier>, policy: ReconcilerPolicy) -> Self {
        Self {
            verifier,
            policy,
            events: None,
        }
    }

    pub fn with_events(mut self, events: PaymentEvents) -> Self {
        self.events = Some(events);
        self
    }

    pub fn policy(&self) -> ReconcilerPolicy {
        self.policy
    }

    /// Reconcile one callback with a private tracker.
    pub async fn reconcile(
        &self,
        session: &SessionContext,
        params: &CallbackParameters,
    ) -> ReconciliationResult {
        let tracker = ReconciliationTracker::new();
        self.reconcile_tracked(session, params, &tracker).await
    }

    /// Reconcile one callback, publishing progress through `tracker`.
    ///
    /// A tracker that already holds a terminal result is left untouched and
    /// that result is returned.
    pub async fn reconcile_tracked(
        &self,
        session: &SessionContext,
        params: &CallbackParameters,
        tracker: &ReconciliationTracker,
    ) -> ReconciliationResult {
        let current = tracker.current();
        if current.state.is_terminal() {
            warn!(
                "Reconciliation already finished as {}, skipping callback: reference={:?}",
                current.state,
                params.payment_reference()
            );
            return current;
        }

        let outcome = self.decide(session, params, tracker).await;

        info!(
            "Payment callback reconciled: state={}, provenance={:?}, transaction_id={:?}, reference={:?}",
            outcome.state,
            outcome.provenance(),
            params.transaction_id(),
            params.payment_reference()
        );

        match tracker.finish(outcome) {
            Ok(result) => result,
            Err(e) => {
                warn!("Discarding reconciliation outcome: {}", e);
                tracker.current()
            }
        }
    }

    async fn decide(
        &self,
        session: &SessionContext,
        params: &CallbackParameters,
        tracker: &ReconciliationTracker,
    ) -> ReconciliationResult {
        debug!(
            "Callback parameters: transaction_id={:?}, reference={:?}, status={:?}, error={:?}",
            params.transaction_id(),
            params.payment_reference(),
            params.status(),
            params.error()
        );

        if let Some(reason) = params.error() {
            info!("Relay reported payment error: {}", reason);
            return ReconciliationResult::error(reason);
        }

        let (transaction_id, payment_reference) =
            match (params.transaction_id(), params.payment_reference()) {
                (Some(id), Some(reference)) => (id, reference),
                _ => {
                    warn!("Payment callback is missing transaction identifiers");
                    return ReconciliationResult::error(MISSING_DETAILS_MESSAGE);
                }
            };

        if self.policy.trust_gateway_status {
            match params.gateway_status() {
                GatewayStatus::Positive => {
                    return ReconciliationResult::success(
                        DIRECT_SUCCESS_MESSAGE,
                        PaymentDetails::from_callback(
                            transaction_id,
                            payment_reference,
                            params.status(),
                            Provenance::Direct,
                        ),
                    );
                }
                GatewayStatus::Negative => {
                    let status = params.status().unwrap_or_default().to_lowercase();
                    return ReconciliationResult::failed(
                        format!("Payment {}. Please try again or contact support.", status),
                        Some(PaymentDetails::from_callback(
                            transaction_id,
                            payment_reference,
                            params.status(),
                            Provenance::Direct,
                        )),
                    );
                }
                GatewayStatus::Indeterminate => {}
            }
        }

        if let Err(e) = tracker.set_message(VERIFYING_MESSAGE) {
            warn!("Could not publish verification progress: {}", e);
        }

        let request = VerificationRequest {
            transaction_id: transaction_id.to_string(),
            payment_reference: payment_reference.to_string(),
            status: params.status().map(str::to_string),
        };

        match self.verifier.verify_callback(session, request).await {
            Ok(response) if response.success => {
                let details = verified_details(&response, transaction_id, payment_reference);
                self.notify_completed(transaction_id, payment_reference, response);
                ReconciliationResult::success(VERIFIED_SUCCESS_MESSAGE, details)
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| VERIFICATION_FAILED_MESSAGE.to_string());
                ReconciliationResult::failed(message, None)
            }
            Err(e) if params.reported_success() && self.policy.accept_unverified_success => {
                warn!(
                    "Verification failed for gateway-reported success, accepting unverified: reference={}, error={}",
                    payment_reference, e
                );
                ReconciliationResult::success(
                    FALLBACK_SUCCESS_MESSAGE,
                    PaymentDetails::from_callback(
                        transaction_id,
                        payment_reference,
                        params.status(),
                        Provenance::FallbackSuccess,
                    ),
                )
            }
            Err(e) => {
                warn!(
                    "Payment verification error: reference={}, retryable={}, error={}",
                    payment_reference,
                    e.is_retryable(),
                    e
                );
                ReconciliationResult::error(format!(
                    "{}: {}",
                    VERIFICATION_FAILED_MESSAGE,
                    e.user_message()
                ))
            }
        }
    }

    fn notify_completed(
        &self,
        transaction_id: &str,
        payment_reference: &str,
        verification: VerificationResponse,
    ) {
        if let Some(events) = &self.events {
            let receivers = events.publish(PaymentCompleted {
                transaction_id: transaction_id.to_string(),
                payment_reference: payment_reference.to_string(),
                verification,
            });
            debug!("Payment-completed event delivered to {} subscribers", receivers);
        }
    }
}

fn verified_details(
    response: &VerificationResponse,
    transaction_id: &str,
    payment_reference: &str,
) -> PaymentDetails {
    PaymentDetails {
        transaction_id: response
            .transaction_id
            .clone()
            .or_else(|| Some(transaction_id.to_string())),
        payment_reference: response
            .payment_reference
            .clone()
            .or_else(|| Some(payment_reference.to_string())),
        amount: response.amount,
        currency: response.currency.clone(),
        course_name: response.course_name.clone(),
        enrollment_id: response.enrollment_id.clone(),
        status: response.payment_status.clone(),
        provenance: Some(Provenance::Verified),
    }
}
