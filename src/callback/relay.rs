//! Backend relay normalisation
//!
//! The backend sometimes redirects the browser to a relay route with the
//! gateway's raw parameters. Only the identifiers and status are carried
//! over to the callback route; everything else is dropped.

use crate::error::{AppError, AppResult};
use reqwest::Url;

pub const CALLBACK_PATH: &str = "/payment/callback";

const FORWARDED_KEYS: &[&str] = &["payment_reference", "status", "tx_ref", "transaction_id"];

// Only used to borrow `Url`'s query encoder; never leaves this module.
const ENCODER_BASE: &str = "http://relay.invalid";

/// Location of the callback route for the given relay parameters
pub fn callback_location(pairs: &[(String, String)]) -> AppResult<String> {
    let mut url = Url::parse(&format!("{}{}", ENCODER_BASE, CALLBACK_PATH))
        .map_err(|e| AppError::configuration(format!("Invalid callback base URL: {}", e)))?;

    let forwarded: Vec<(&str, &str)> = FORWARDED_KEYS
        .iter()
        .filter_map(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| (*key, v.as_str()))
                .filter(|(_, v)| !v.is_empty())
        })
        .collect();

    if !forwarded.is_empty() {
        url.query_pairs_mut().extend_pairs(forwarded);
    }

    Ok(match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
        _ => url.path().to_string(),
    })
}
