//! Ingest trigger handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Json, Router};

use crate::api::dto::IngestForm;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, HubError};
use crate::service::IngestOutcome;

/// `POST /ingest` — Run one ingest cycle against the named feed.
///
/// Concurrent triggers are allowed; the store's idempotency primitives
/// keep the result correct without any single-flight coordination.
///
/// # Errors
///
/// Returns [`HubError::FetchFailed`] / [`HubError::FeedDecode`] when the
/// upstream feed is unavailable (nothing is written), or
/// [`HubError::Storage`] on persistence failure.
#[utoipa::path(
    post,
    path = "/ingest",
    tag = "Ingest",
    summary = "Trigger an ingest cycle",
    description = "Fetches the feed, dedups it into storage, matches every batch quake against every rule, and records exactly-once alerts.",
    request_body(content = IngestForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Cycle outcome", body = IngestOutcome),
        (status = 502, description = "Upstream feed failure", body = ErrorResponse),
    )
)]
pub async fn trigger_ingest(
    State(state): State<AppState>,
    Form(form): Form<IngestForm>,
) -> Result<impl IntoResponse, HubError> {
    let outcome = state.ingest.run_cycle(&form.feed).await?;
    Ok(Json(outcome))
}

/// Ingest routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/ingest", post(trigger_ingest))
}
