//! Operational notifications published through the event bus.
//!
//! Every pipeline outcome publishes a [`Notification`] through the
//! [`super::EventBus`]. Notifications are transient observability data for
//! live observers (the SSE stream, the tail endpoint). They have no
//! relation to persisted alerts, and a restart loses bus history but not
//! alert history.

use serde::{Deserialize, Serialize};

use super::Quake;

/// Minimal rule snapshot embedded in alert notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRef {
    /// Rule identifier.
    pub id: i64,
    /// Rule name at the time of the match.
    pub name: String,
}

/// Notification payload, discriminated by a `type` tag in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationKind {
    /// A quake matched a rule and a new alert was recorded.
    QuakeDetected {
        /// The rule that matched.
        rule: RuleRef,
        /// The matching quake.
        quake: Quake,
    },

    /// An ingest cycle finished.
    IngestCompleted {
        /// Feed key or URL the cycle ingested from.
        feed: String,
        /// Number of normalized records in the batch.
        ingested: usize,
        /// Number of newly recorded alerts.
        alerts: usize,
    },

    /// Manually published smoke-test event (`POST /events/test`).
    TestEvent {
        /// Free-text message.
        message: String,
    },
}

impl NotificationKind {
    /// Returns the notification type as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::QuakeDetected { .. } => "QuakeDetected",
            Self::IngestCompleted { .. } => "IngestCompleted",
            Self::TestEvent { .. } => "TestEvent",
        }
    }
}

/// A notification with its receive timestamp.
///
/// The bus stamps `ts_ms` on publish when the producer did not set one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Receive timestamp in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_ms: Option<i64>,
    /// The notification payload.
    #[serde(flatten)]
    pub kind: NotificationKind,
}

impl Notification {
    /// Creates a notification with no timestamp; the bus stamps it on
    /// publish.
    #[must_use]
    pub fn new(kind: NotificationKind) -> Self {
        Self { ts_ms: None, kind }
    }

    /// Creates a notification carrying an explicit timestamp.
    #[must_use]
    pub fn at(kind: NotificationKind, ts_ms: i64) -> Self {
        Self {
            ts_ms: Some(ts_ms),
            kind,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let n = Notification::at(
            NotificationKind::IngestCompleted {
                feed: "all_hour".to_string(),
                ingested: 2,
                alerts: 1,
            },
            1_700_000_000_000,
        );
        let Ok(json) = serde_json::to_value(&n) else {
            panic!("serialize failed");
        };
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("IngestCompleted"));
        assert_eq!(json.get("ingested").and_then(serde_json::Value::as_u64), Some(2));
        assert_eq!(
            json.get("ts_ms").and_then(serde_json::Value::as_i64),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn kind_str_matches_tag() {
        let kind = NotificationKind::TestEvent {
            message: "hi".to_string(),
        };
        assert_eq!(kind.kind_str(), "TestEvent");
    }
}
