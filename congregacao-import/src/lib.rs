//! congregacao-import library interface
//!
//! Validation and normalization of schedule data extracted from meeting
//! workbooks and spreadsheets, plus the HTTP surface that exposes it.

pub mod api;
pub mod cleaners;
pub mod error;
pub mod pipeline;
pub mod schedules;
pub mod types;
pub mod validators;

pub use crate::error::{ApiError, ApiResult};
pub use crate::pipeline::{ImportDomain, ImportReport, Importer};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Validation/cleaning entry point over the read-only roster
    pub importer: Importer,
    /// Roster size, reported by the health check
    pub roster_entries: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(importer: Importer, roster_entries: usize) -> Self {
        Self {
            importer,
            roster_entries,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
