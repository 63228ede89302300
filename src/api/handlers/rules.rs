//! Rule CRUD handlers: create, list, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Form, Json, Router};

use crate::api::dto::{CreateRuleForm, CreateRuleResponse, RuleDto};
use crate::app_state::AppState;
use crate::domain::BoundingBox;
use crate::error::{ErrorResponse, HubError};

/// `POST /rules` — Create a new alerting rule.
///
/// # Errors
///
/// Returns [`HubError::InvalidBoundingBox`] when the bbox field does not
/// parse, or [`HubError::Storage`] on persistence failure.
#[utoipa::path(
    post,
    path = "/rules",
    tag = "Rules",
    summary = "Create an alerting rule",
    description = "Creates a rule from a magnitude threshold and an optional `lon1,lat1,lon2,lat2` bounding box. Swapped corners are normalized.",
    request_body(content = CreateRuleForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Rule created", body = CreateRuleResponse),
        (status = 400, description = "Invalid bounding box", body = ErrorResponse),
    )
)]
pub async fn create_rule(
    State(state): State<AppState>,
    Form(form): Form<CreateRuleForm>,
) -> Result<impl IntoResponse, HubError> {
    let bbox = form
        .bbox
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<BoundingBox>)
        .transpose()?;

    let created = state
        .store
        .create_rule(&form.name, form.min_mag, bbox.as_ref())
        .await?;

    tracing::info!(rule_id = created, name = %form.name, "rule created");
    Ok(Json(CreateRuleResponse { created }))
}

/// `GET /rules` — List all rules, most recently created first.
///
/// # Errors
///
/// Returns [`HubError::Storage`] on persistence failure.
#[utoipa::path(
    get,
    path = "/rules",
    tag = "Rules",
    summary = "List rules",
    responses(
        (status = 200, description = "Rule list, id descending", body = Vec<RuleDto>),
    )
)]
pub async fn list_rules(State(state): State<AppState>) -> Result<impl IntoResponse, HubError> {
    let rules = state.store.list_rules().await?;
    let dtos: Vec<RuleDto> = rules.into_iter().map(RuleDto::from).collect();
    Ok(Json(dtos))
}

/// `DELETE /rules/{id}` — Delete a rule.
///
/// Existing alerts that reference the rule remain as history.
///
/// # Errors
///
/// Returns [`HubError::RuleNotFound`] if the rule does not exist.
#[utoipa::path(
    delete,
    path = "/rules/{id}",
    tag = "Rules",
    summary = "Delete a rule",
    params(
        ("id" = i64, Path, description = "Rule id"),
    ),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 404, description = "Rule not found", body = ErrorResponse),
    )
)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HubError> {
    if !state.store.delete_rule(id).await? {
        return Err(HubError::RuleNotFound(id));
    }
    tracing::info!(rule_id = id, "rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Rule management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rules", post(create_rule).get(list_rules))
        .route("/rules/{id}", delete(delete_rule))
}
