//! Callback query parameter extraction
//!
//! Gateways and the backend relay have used different names for the same
//! identifiers over time. Each logical field has an ordered list of
//! candidate keys; the first key carrying a non-empty value wins.

use reqwest::Url;

const TRANSACTION_ID_KEYS: &[&str] = &["transaction_id", "tx_ref", "payment_reference"];
const PAYMENT_REFERENCE_KEYS: &[&str] = &["payment_reference", "tx_ref", "reference"];
const STATUS_KEYS: &[&str] = &["status"];
const ERROR_KEYS: &[&str] = &["error"];

const POSITIVE_STATUSES: &[&str] = &["successful", "success", "completed"];
const NEGATIVE_STATUSES: &[&str] = &["failed", "cancelled"];
// Statuses trusted when verification cannot be reached
const REPORTED_SUCCESS_STATUSES: &[&str] = &["successful", "success"];

/// How the gateway's `status` parameter reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Positive,
    Negative,
    Indeterminate,
}

/// Parameters of one callback redirect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParameters {
    transaction_id: Option<String>,
    payment_reference: Option<String>,
    status: Option<String>,
    error: Option<String>,
    raw: Vec<(String, String)>,
}

impl CallbackParameters {
    /// Build from already-decoded query pairs, in URL order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let raw: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            transaction_id: lookup(&raw, TRANSACTION_ID_KEYS),
            payment_reference: lookup(&raw, PAYMENT_REFERENCE_KEYS),
            status: lookup(&raw, STATUS_KEYS),
            error: lookup(&raw, ERROR_KEYS),
            raw,
        }
    }

    /// Build from a full callback URL; query values are percent-decoded.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Relay-supplied failure reason, decoded.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Query pairs exactly as received
    pub fn raw(&self) -> &[(String, String)] {
        &self.raw
    }

    pub fn gateway_status(&self) -> GatewayStatus {
        match self.status.as_deref() {
            Some(status) if matches_any(status, POSITIVE_STATUSES) => GatewayStatus::Positive,
            Some(status) if matches_any(status, NEGATIVE_STATUSES) => GatewayStatus::Negative,
            _ => GatewayStatus::Indeterminate,
        }
    }

    /// True when the gateway itself claimed `successful` or `success`.
    pub fn reported_success(&self) -> bool {
        self.status
            .as_deref()
            .map(|status| matches_any(status, REPORTED_SUCCESS_STATUSES))
            .unwrap_or(false)
    }
}

fn lookup(pairs: &[(String, String)], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .filter(|v| !v.is_empty())
            .cloned()
    })
}

fn matches_any(value: &str, candidates: &[&str]) -> bool {
    candidates
        .iter()
        .any(|candidate| value.eq_ignore_ascii_case(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> CallbackParameters {
        CallbackParameters::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_primary_keys() {
        let p = params(&[
            ("transaction_id", "T1"),
            ("payment_reference", "R1"),
            ("status", "successful"),
        ]);
        assert_eq!(p.transaction_id(), Some("T1"));
        assert_eq!(p.payment_reference(), Some("R1"));
        assert_eq!(p.status(), Some("successful"));
        assert_eq!(p.error(), None);
    }

    #[test]
    fn test_tx_ref_fills_both_identifiers() {
        let p = params(&[("tx_ref", "IGA-42"), ("status", "completed")]);
        assert_eq!(p.transaction_id(), Some("IGA-42"));
        assert_eq!(p.payment_reference(), Some("IGA-42"));
    }

    #[test]
    fn test_alias_order() {
        // transaction_id prefers tx_ref over payment_reference,
        // payment_reference prefers itself over tx_ref.
        let p = params(&[("payment_reference", "R9"), ("tx_ref", "TX9")]);
        assert_eq!(p.transaction_id(), Some("TX9"));
        assert_eq!(p.payment_reference(), Some("R9"));

        let p = params(&[("transaction_id", "T9"), ("reference", "REF9")]);
        assert_eq!(p.payment_reference(), Some("REF9"));
    }

    #[test]
    fn test_empty_values_fall_through() {
        let p = params(&[("transaction_id", ""), ("tx_ref", "TX1"), ("error", "")]);
        assert_eq!(p.transaction_id(), Some("TX1"));
        assert_eq!(p.error(), None);
    }

    #[test]
    fn test_first_occurrence_of_a_key_wins() {
        let p = params(&[("status", "failed"), ("status", "successful")]);
        assert_eq!(p.status(), Some("failed"));
        assert_eq!(p.raw().len(), 2);
    }

    #[test]
    fn test_gateway_status_is_case_insensitive() {
        for status in ["SUCCESSFUL", "Success", "completed"] {
            assert_eq!(
                params(&[("status", status)]).gateway_status(),
                GatewayStatus::Positive
            );
        }
        for status in ["FAILED", "Cancelled"] {
            assert_eq!(
                params(&[("status", status)]).gateway_status(),
                GatewayStatus::Negative
            );
        }
        for status in ["pending", "canceled", ""] {
            assert_eq!(
                params(&[("status", status)]).gateway_status(),
                GatewayStatus::Indeterminate
            );
        }
        assert_eq!(params(&[]).gateway_status(), GatewayStatus::Indeterminate);
    }

    #[test]
    fn test_reported_success_excludes_completed() {
        assert!(params(&[("status", "Success")]).reported_success());
        assert!(params(&[("status", "SUCCESSFUL")]).reported_success());
        assert!(!params(&[("status", "completed")]).reported_success());
        assert!(!params(&[]).reported_success());
    }

    #[test]
    fn test_from_url_decodes_values() {
        let url = Url::parse(
            "https://learn.example.com/payment/callback?error=Card%20declined&tx_ref=A%2BB",
        )
        .unwrap();
        let p = CallbackParameters::from_url(&url);
        assert_eq!(p.error(), Some("Card declined"));
        assert_eq!(p.transaction_id(), Some("A+B"));
    }
}
