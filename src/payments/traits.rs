//! Payment verifier trait definition

use crate::error::AppResult;
use crate::payments::types::{VerificationRequest, VerificationResponse};
use crate::session::SessionContext;
use async_trait::async_trait;

/// Confirms a gateway callback with the backend that owns enrollment and
/// the payment ledger.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Verify the payment identified by a callback
    ///
    /// # Arguments
    /// * `session` - Caller session; its token, if any, authenticates the call
    /// * `request` - Identifiers and gateway status taken from the callback
    ///
    /// # Returns
    /// * `Ok(VerificationResponse)` - The backend answered; inspect `success`
    /// * `Err(AppError)` - The call could not be completed or was rejected
    async fn verify_callback(
        &self,
        session: &SessionContext,
        request: VerificationRequest,
    ) -> AppResult<VerificationResponse>;
}
