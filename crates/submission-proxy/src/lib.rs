//! Submission Proxy
//!
//! Receives the test-drive registration form, applies the server-side
//! submission limit and forwards the payload verbatim to the spreadsheet
//! script configured in `GOOGLE_SCRIPT_URL`. Field rules are enforced by the
//! page; the proxy only re-checks them when `VALIDATE_FORM_FIELDS` is set.
//!
//! ## Endpoints
//!
//! - `POST /api/submit-to-sheets` - Gate and forward a form
//! - `GET /health` - Health check

pub mod config;
pub mod handlers;
pub mod upstream;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use submission_gate::SubmissionGate;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use testdrive_common::UpstreamReply;
pub use upstream::UpstreamClient;

/// Application state shared across handlers
pub struct AppState {
    /// Server-side mirror of the submission limit, if enabled
    pub gate: Option<SubmissionGate>,

    /// Upstream script client; `None` while the URL is not configured
    pub upstream: Option<UpstreamClient>,

    /// Include internal error detail in 500 responses
    pub expose_error_details: bool,

    /// Reject forms that break the page's field rules with 400
    pub validate_fields: bool,
}

impl AppState {
    pub fn new(config: &Config, gate: Option<SubmissionGate>) -> Self {
        Self {
            gate,
            upstream: config.google_script_url.clone().map(UpstreamClient::new),
            expose_error_details: config.expose_error_details,
            validate_fields: config.validate_fields,
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/submit-to-sheets", post(handlers::submit_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
