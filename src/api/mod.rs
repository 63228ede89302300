//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted at the root, matching the surface the
//! dashboard's forms and any pre-existing clients expect.

pub mod dto;
pub mod handlers;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document covering the JSON endpoints. The dashboard page and
/// the SSE stream are intentionally absent; they are not JSON APIs.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::rules::create_rule,
        handlers::rules::list_rules,
        handlers::rules::delete_rule,
        handlers::ingest::trigger_ingest,
        handlers::alerts::list_alerts,
        handlers::alerts::daily_report,
        handlers::events::tail_events,
        handlers::events::publish_test,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Rules", description = "Alerting rule management"),
        (name = "Ingest", description = "Feed ingest trigger"),
        (name = "Alerts", description = "Alert history and reports"),
        (name = "Events", description = "Operational notification bus"),
        (name = "System", description = "Health and metrics"),
    )
)]
pub struct ApiDoc;

/// Builds the complete router with all endpoints.
///
/// `metrics` carries the Prometheus handle on the server path; tests pass
/// `None` and get a router without `/metrics`.
pub fn build_router(metrics: Option<PrometheusHandle>) -> Router<AppState> {
    let router = Router::new()
        .merge(handlers::routes())
        .merge(handlers::system::routes(metrics));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
