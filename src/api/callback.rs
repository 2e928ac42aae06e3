//! Callback landing handlers

use axum::{
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    Json,
};
use tracing::{error, info};

use super::AppState;
use crate::callback::relay::callback_location;
use crate::callback::view::DebugInfo;
use crate::callback::{CallbackParameters, CallbackView, ReconciliationTracker};
use crate::session::SessionContext;

/// Reconcile the redirect that landed on this route and return its view.
///
/// Always answers `200`: every outcome, including malformed callbacks, is a
/// renderable page.
pub async fn payment_callback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<CallbackView> {
    let session = SessionContext::from_headers(&headers);
    let params = CallbackParameters::from_pairs(pairs);

    let tracker = ReconciliationTracker::new();
    let result = state
        .reconciler
        .reconcile_tracked(&session, &params, &tracker)
        .await;

    let mut view = CallbackView::from_result(&result);
    if state.config.server.is_development() {
        view = view.with_debug(DebugInfo::new(uri.to_string(), &params));
    }

    Json(view)
}

/// Forward a backend relay redirect to the callback route.
pub async fn backend_callback(
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Redirect, StatusCode> {
    let location = callback_location(&pairs).map_err(|e| {
        error!("Failed to build callback location: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!("Redirecting backend relay to {}", location);
    Ok(Redirect::to(&location))
}
