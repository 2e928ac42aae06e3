//! HTTP surface: callback landing routes, relay redirect and health.

pub mod callback;
pub mod health;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::callback::{CallbackReconciler, PaymentEvents};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub reconciler: Arc<CallbackReconciler>,
    pub events: PaymentEvents,
}

impl AppState {
    pub fn new(config: Config, reconciler: CallbackReconciler, events: PaymentEvents) -> Self {
        Self {
            config,
            reconciler: Arc::new(reconciler),
            events,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/payment/callback", get(callback::payment_callback))
        .route("/api/public/payments/callback", get(callback::payment_callback))
        .route("/callback", get(callback::payment_callback))
        .route("/payment/backend-callback", get(callback::backend_callback))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
