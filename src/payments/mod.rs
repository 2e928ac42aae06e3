//! Payment verification module
//!
//! The callback reconciler asks the backend to confirm a payment through the
//! `PaymentVerifier` trait; `providers` holds the HTTP implementation.

pub mod providers;
pub mod traits;
pub mod types;

pub use traits::PaymentVerifier;
pub use types::{VerificationRequest, VerificationResponse};
