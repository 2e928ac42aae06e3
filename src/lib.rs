//! Payment callback reconciliation service
//!
//! Receives the browser after a payment gateway (or the backend relay)
//! redirects it back, settles whether the payment succeeded and returns a
//! view of the outcome.

pub mod api;
pub mod callback;
pub mod config;
pub mod error;
pub mod payments;
pub mod session;
