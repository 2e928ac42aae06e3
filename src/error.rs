//! Application error types
//!
//! Errors are grouped by where they come from: external collaborators (the
//! backend verification endpoint) and local infrastructure (configuration,
//! HTTP client setup).

use std::fmt;
use thiserror::Error;

/// Result type used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Failures raised by services outside this process
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalError {
    #[error("{provider} error: {message}")]
    PaymentProvider {
        provider: String,
        message: String,
        is_retryable: bool,
    },

    #[error("{service} timed out after {seconds} seconds")]
    Timeout { service: String, seconds: u64 },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Failures in local setup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InfrastructureError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("HTTP client error: {message}")]
    HttpClient { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorKind {
    External(ExternalError),
    Infrastructure(InfrastructureError),
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::External(e) => write!(f, "{}", e),
            AppErrorKind::Infrastructure(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: AppErrorKind,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self { kind }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AppErrorKind::Infrastructure(
            InfrastructureError::Configuration {
                message: message.into(),
            },
        ))
    }

    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            AppErrorKind::External(ExternalError::PaymentProvider { is_retryable, .. }) => {
                *is_retryable
            }
            AppErrorKind::External(ExternalError::Timeout { .. })
            | AppErrorKind::External(ExternalError::Network { .. }) => true,
            AppErrorKind::Infrastructure(_) => false,
        }
    }

    /// Message suitable for showing to the paying user.
    ///
    /// Provider errors surface the provider's own message without the
    /// provider prefix, everything else uses its display form.
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::External(ExternalError::PaymentProvider { message, .. }) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for AppError {}

impl From<ExternalError> for AppError {
    fn from(err: ExternalError) -> Self {
        AppError::new(AppErrorKind::External(err))
    }
}

impl From<InfrastructureError> for AppError {
    fn from(err: InfrastructureError) -> Self {
        AppError::new(AppErrorKind::Infrastructure(err))
    }
}

// Timeouts are mapped by the caller, which knows the configured limit.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        ExternalError::Network {
            message: format!("Request error: {}", err),
        }
        .into()
    }
}
