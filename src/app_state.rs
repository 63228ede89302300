//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::Store;
use crate::service::IngestService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ingest pipeline orchestrator.
    pub ingest: Arc<IngestService>,
    /// Persistence handle for rules, alerts, and reports.
    pub store: Store,
    /// Event bus for the tail and stream endpoints.
    pub event_bus: EventBus,
}
