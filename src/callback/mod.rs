//! Payment callback handling
//!
//! Parsing of gateway redirect parameters, the reconciliation state machine
//! and the view the landing page renders from its result.

pub mod events;
pub mod params;
pub mod reconciler;
pub mod relay;
pub mod state;
pub mod view;

pub use events::{PaymentCompleted, PaymentEvents};
pub use params::{CallbackParameters, GatewayStatus};
pub use reconciler::{CallbackReconciler, ReconcilerPolicy};
pub use state::{
    PaymentDetails, Provenance, ReconciliationResult, ReconciliationState, ReconciliationTracker,
};
pub use view::CallbackView;
