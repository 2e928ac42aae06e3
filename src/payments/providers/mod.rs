//! Payment verifier implementations

pub mod backend;

pub use backend::{BackendVerifier, BackendVerifierConfig};
