//! REST endpoint handlers organized by resource.

pub mod alerts;
pub mod dashboard;
pub mod events;
pub mod ingest;
pub mod rules;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes (everything except system routes).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::routes())
        .merge(rules::routes())
        .merge(ingest::routes())
        .merge(alerts::routes())
        .merge(events::routes())
}
