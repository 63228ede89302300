//! Ingest pipeline: fetch → persist → match → alert → notify.

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventBus, Notification, NotificationKind, RuleRef};
use crate::error::HubError;
use crate::feed::FeedClient;
use crate::persistence::Store;

/// One alert newly recorded during an ingest cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertFired {
    /// The matched quake's id.
    pub quake_id: String,
    /// The matching rule's id.
    pub rule_id: i64,
    /// The quake's magnitude.
    pub mag: f64,
    /// The quake's location description.
    pub place: String,
}

/// Synchronous result of one ingest cycle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestOutcome {
    /// Number of normalized records in the fetched batch. Duplicates
    /// attempted against the store are included; records dropped during
    /// normalization are not.
    pub ingested: usize,
    /// Alerts newly recorded this cycle. Re-matches whose `(quake, rule)`
    /// pair already had an alert are absent.
    pub alerts: Vec<AlertFired>,
}

/// Orchestrates one complete ingest cycle against the injected
/// collaborators.
///
/// Stateless between calls: all durable state lives in the [`Store`], and
/// correctness under concurrent cycles rests entirely on its atomic
/// insert-or-ignore and unique-constrained inserts; there is no
/// single-flight guard here.
#[derive(Debug, Clone)]
pub struct IngestService {
    feed: FeedClient,
    store: Store,
    event_bus: EventBus,
}

impl IngestService {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(feed: FeedClient, store: Store, event_bus: EventBus) -> Self {
        Self {
            feed,
            store,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`Store`].
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Runs one ingest cycle against `source`.
    ///
    /// Fetches a batch, upserts it, snapshots the rule set once, then
    /// evaluates every batch quake against every snapshot rule. Only newly
    /// recorded alerts (a `true` from the store) enter the outcome and
    /// publish a `QuakeDetected` notification; one `IngestCompleted`
    /// summary follows. Matching is scoped to this cycle's batch, never
    /// the whole store.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures (nothing written) and storage failures
    /// unchanged. There is no retry here; schedulers own that policy.
    pub async fn run_cycle(&self, source: &str) -> Result<IngestOutcome, HubError> {
        let started = Instant::now();

        let batch = self.feed.fetch(source).await?;
        let ingested = batch.len();

        let inserted = self.store.upsert_quakes(&batch).await?;
        metrics::counter!("quakes_ingested_total").increment(ingested as u64);

        // Rule snapshot: rules created mid-cycle by a concurrent request
        // are not guaranteed to apply to this cycle's matching pass.
        let rules = self.store.list_rules().await?;

        let created_ms = Utc::now().timestamp_millis();
        let mut alerts = Vec::new();
        for quake in &batch {
            for rule in &rules {
                if !rule.matches(quake) {
                    continue;
                }
                if self.store.record_alert(&quake.id, rule.id, created_ms).await? {
                    tracing::info!(
                        rule_id = rule.id,
                        rule_name = %rule.name,
                        quake_id = %quake.id,
                        mag = quake.mag,
                        place = %quake.place,
                        "alert recorded"
                    );
                    metrics::counter!("alerts_emitted_total").increment(1);
                    self.event_bus.publish(Notification::new(
                        NotificationKind::QuakeDetected {
                            rule: RuleRef {
                                id: rule.id,
                                name: rule.name.clone(),
                            },
                            quake: quake.clone(),
                        },
                    ));
                    alerts.push(AlertFired {
                        quake_id: quake.id.clone(),
                        rule_id: rule.id,
                        mag: quake.mag,
                        place: quake.place.clone(),
                    });
                }
            }
        }

        self.event_bus.publish(Notification::new(
            NotificationKind::IngestCompleted {
                feed: source.to_string(),
                ingested,
                alerts: alerts.len(),
            },
        ));

        metrics::gauge!("last_ingest_timestamp").set(Utc::now().timestamp_millis() as f64);
        metrics::histogram!("ingest_duration_seconds").record(started.elapsed().as_secs_f64());

        tracing::info!(
            source,
            ingested,
            inserted,
            alerts = alerts.len(),
            "ingest cycle complete"
        );

        Ok(IngestOutcome { ingested, alerts })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service() -> IngestService {
        let Ok(feed) = FeedClient::new(Duration::from_secs(5)) else {
            panic!("client build failed");
        };
        let Ok(store) = Store::memory().await else {
            panic!("memory store failed");
        };
        IngestService::new(feed, store, EventBus::new(100))
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "us123",
                "properties": {"time": 1_700_000_000_000_i64, "mag": 3.2, "place": "10km W of Test, CA"},
                "geometry": {"type": "Point", "coordinates": [-121.5, 37.5, 10.0]},
            }],
        })
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service().await;
        let result = service.run_cycle(&server.uri()).await;
        assert!(matches!(result, Err(HubError::FetchFailed(_))));

        let Ok(stored) = service.store().list_recent_quakes(10).await else {
            panic!("list failed");
        };
        assert!(stored.is_empty());
        assert!(service.event_bus().tail(10).is_empty());
    }

    #[tokio::test]
    async fn cycle_publishes_alert_then_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let service = service().await;
        let _ = service.store().create_rule("M3+", 3.0, None).await;

        let result = service.run_cycle(&server.uri()).await;
        let Ok(outcome) = result else {
            panic!("cycle failed: {result:?}");
        };
        assert_eq!(outcome.ingested, 1);
        assert_eq!(outcome.alerts.len(), 1);

        let kinds: Vec<&str> = service
            .event_bus()
            .tail(10)
            .iter()
            .map(|n| n.kind.kind_str())
            .collect();
        assert_eq!(kinds, vec!["QuakeDetected", "IngestCompleted"]);
    }

    #[tokio::test]
    async fn summary_is_published_even_with_no_rules() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let service = service().await;
        let result = service.run_cycle(&server.uri()).await;
        let Ok(outcome) = result else {
            panic!("cycle failed: {result:?}");
        };
        assert!(outcome.alerts.is_empty());

        let tail = service.event_bus().tail(10);
        assert_eq!(tail.len(), 1);
        assert_eq!(
            tail.first().map(|n| n.kind.kind_str()),
            Some("IngestCompleted")
        );
    }
}
