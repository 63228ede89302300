//! Alert history and daily report handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DaysParams, LimitParams};
use crate::app_state::AppState;
use crate::error::HubError;
use crate::persistence::{AlertView, DailyBucket};

/// `GET /alerts` — Recent alerts joined with quake and rule snapshots.
///
/// # Errors
///
/// Returns [`HubError::Storage`] on persistence failure.
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "Alerts",
    summary = "List recent alerts",
    params(LimitParams),
    responses(
        (status = 200, description = "Alerts, newest first", body = Vec<AlertView>),
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, HubError> {
    let alerts = state.store.list_alerts(params.limit).await?;
    Ok(Json(alerts))
}

/// `GET /reports/daily` — Quake activity grouped by UTC calendar day.
///
/// # Errors
///
/// Returns [`HubError::Storage`] on persistence failure.
#[utoipa::path(
    get,
    path = "/reports/daily",
    tag = "Alerts",
    summary = "Daily activity report",
    params(DaysParams),
    responses(
        (status = 200, description = "Day buckets, most recent first", body = Vec<DailyBucket>),
    )
)]
pub async fn daily_report(
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> Result<impl IntoResponse, HubError> {
    let report = state.store.daily_report(params.days).await?;
    Ok(Json(report))
}

/// Alert and report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/reports/daily", get(daily_report))
}
