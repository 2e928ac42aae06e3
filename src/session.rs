//! Caller session context
//!
//! The session travels explicitly with each request: it is built when the
//! callback request arrives, handed to the verifier, and dropped when the
//! request completes.

use http::header::AUTHORIZATION;
use http::HeaderMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Build a session from an `Authorization: Bearer <token>` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => Self::with_token(token),
            None => Self::anonymous(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Logout: forget the token.
    pub fn clear(&mut self) {
        self.token = None;
    }
}
