//! Event bus handlers: tail, live SSE stream, and the test hook.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::Stream;
use tokio::sync::broadcast;

use crate::api::dto::TailParams;
use crate::app_state::AppState;
use crate::domain::{Notification, NotificationKind};

/// `GET /events/tail` — The most recent notifications, chronological.
#[utoipa::path(
    get,
    path = "/events/tail",
    tag = "Events",
    summary = "Tail recent notifications",
    params(TailParams),
    responses(
        (status = 200, description = "Notifications, oldest of the window first", body = serde_json::Value),
    )
)]
pub async fn tail_events(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> impl IntoResponse {
    Json(state.event_bus.tail(params.n))
}

/// `GET /events/stream` — Live notification stream over SSE.
///
/// Each subscriber blocks on the broadcast channel; there is no poll loop.
/// A subscriber that lags behind the channel skips the missed entries and
/// keeps going; slow observers never block publishers.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_bus.subscribe();
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let Ok(json) = serde_json::to_string(&notification) else {
                        continue;
                    };
                    return Some((Ok(Event::default().data(json)), rx));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "sse client lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// `POST /events/test` — Publish a test notification.
///
/// Smoke hook for the stream and tail endpoints.
#[utoipa::path(
    post,
    path = "/events/test",
    tag = "Events",
    summary = "Publish a test notification",
    responses(
        (status = 200, description = "Published", body = serde_json::Value),
    )
)]
pub async fn publish_test(State(state): State<AppState>) -> impl IntoResponse {
    state.event_bus.publish(Notification::new(NotificationKind::TestEvent {
        message: "Hello from /events/test".to_string(),
    }));
    Json(serde_json::json!({ "published": true }))
}

/// Event bus routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/tail", get(tail_events))
        .route("/events/stream", get(stream_events))
        .route("/events/test", post(publish_test))
}
