//! Renderable view of a reconciliation result
//!
//! Everything the landing page needs: icon, headline, message, receipt
//! panel and the navigation offered for the state.

use crate::callback::params::CallbackParameters;
use crate::callback::state::{PaymentDetails, Provenance, ReconciliationResult, ReconciliationState};
use serde::Serialize;

pub const DASHBOARD_PATH: &str = "/student/dashboard";
pub const PAYMENT_HISTORY_PATH: &str = "/student/payments";
pub const COURSES_PATH: &str = "/courses";
pub const SUPPORT_PATH: &str = "/contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusIcon {
    Spinner,
    CheckCircle,
    AlertCircle,
    XCircle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationAction {
    pub label: String,
    pub path: String,
    pub primary: bool,
}

impl NavigationAction {
    fn new(label: &str, path: &str, primary: bool) -> Self {
        Self {
            label: label.to_string(),
            path: path.to_string(),
            primary,
        }
    }
}

/// Receipt panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPanel {
    pub transaction_id: Option<String>,
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    pub status: String,
    pub provenance: Option<Provenance>,
}

impl From<&PaymentDetails> for DetailsPanel {
    fn from(details: &PaymentDetails) -> Self {
        Self {
            transaction_id: details
                .transaction_id
                .clone()
                .or_else(|| details.payment_reference.clone()),
            reference: details.payment_reference.clone(),
            amount: details.amount,
            currency: details.currency.clone(),
            course_name: details.course_name.clone(),
            status: details
                .status
                .clone()
                .unwrap_or_else(|| "Completed".to_string()),
            provenance: details.provenance,
        }
    }
}

/// Diagnostic dump attached in development
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub url: String,
    pub transaction_id: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_status: Option<String>,
    pub error_param: Option<String>,
    pub all_params: serde_json::Map<String, serde_json::Value>,
}

impl DebugInfo {
    pub fn new(url: impl Into<String>, params: &CallbackParameters) -> Self {
        let mut all_params = serde_json::Map::new();
        for (key, value) in params.raw() {
            all_params.insert(key.clone(), serde_json::Value::String(value.clone()));
        }

        Self {
            url: url.into(),
            transaction_id: params.transaction_id().map(str::to_string),
            payment_reference: params.payment_reference().map(str::to_string),
            payment_status: params.status().map(str::to_string),
            error_param: params.error().map(str::to_string),
            all_params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackView {
    pub state: ReconciliationState,
    pub icon: StatusIcon,
    pub headline: String,
    pub message: String,
    pub details: Option<DetailsPanel>,
    pub actions: Vec<NavigationAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl CallbackView {
    pub fn from_result(result: &ReconciliationResult) -> Self {
        let (icon, headline) = match result.state {
            ReconciliationState::Processing => (StatusIcon::Spinner, "Processing Payment..."),
            ReconciliationState::Success => (StatusIcon::CheckCircle, "Payment Successful!"),
            ReconciliationState::Failed => (StatusIcon::AlertCircle, "Payment Failed"),
            ReconciliationState::Error => (StatusIcon::XCircle, "Payment Error"),
        };

        Self {
            state: result.state,
            icon,
            headline: headline.to_string(),
            message: result.message.clone(),
            details: result.details.as_ref().map(DetailsPanel::from),
            actions: actions_for(result.state),
            debug: None,
        }
    }

    pub fn with_debug(mut self, debug: DebugInfo) -> Self {
        self.debug = Some(debug);
        self
    }
}

pub fn actions_for(state: ReconciliationState) -> Vec<NavigationAction> {
    match state {
        ReconciliationState::Processing => Vec::new(),
        ReconciliationState::Success => vec![
            NavigationAction::new("Go to Dashboard", DASHBOARD_PATH, true),
            NavigationAction::new("View Payment History", PAYMENT_HISTORY_PATH, false),
            NavigationAction::new("Browse More Courses", COURSES_PATH, false),
        ],
        ReconciliationState::Failed | ReconciliationState::Error => vec![
            NavigationAction::new("Back to Courses", COURSES_PATH, true),
            NavigationAction::new("Go to Dashboard", DASHBOARD_PATH, false),
            NavigationAction::new("Contact Support", SUPPORT_PATH, false),
        ],
    }
}
