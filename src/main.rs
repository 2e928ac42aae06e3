use anyhow::Context;
use payment_callback::api::{self, AppState};
use payment_callback::callback::{CallbackReconciler, PaymentEvents};
use payment_callback::config::Config;
use payment_callback::payments::providers::BackendVerifier;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

const EVENT_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.server.is_development() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    }

    tracing::info!("Starting payment callback service");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("Verification endpoint: {}", config.verifier.endpoint());

    let policy = config.callback.policy();
    if policy.accept_unverified_success {
        tracing::warn!(
            "Gateway-reported success is shown when verification is unreachable; enrollment still depends on the backend"
        );
    }

    let verifier = BackendVerifier::new(config.verifier.clone())?;
    let events = PaymentEvents::new(EVENT_CAPACITY);
    let reconciler = CallbackReconciler::new(Arc::new(verifier), policy).with_events(events.clone());

    let mut completed = events.subscribe();
    tokio::spawn(async move {
        loop {
            match completed.recv().await {
                Ok(event) => tracing::info!(
                    "Payment completed: transaction_id={}, reference={}, course={:?}",
                    event.transaction_id,
                    event.payment_reference,
                    event.verification.course_name
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Payment-completed listener lagged, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let state = AppState::new(config.clone(), reconciler, events);
    let app = api::router(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("HOST must be a valid IP address")?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
