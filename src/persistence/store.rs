//! SQLite implementation of the persistence layer.
//!
//! [`Store`] is the only shared mutable resource in the hub. All mutation
//! goes through single atomic statements (`INSERT OR IGNORE`, unique-
//! constrained `ON CONFLICT DO NOTHING`), so concurrent ingest cycles stay
//! correct without any in-process locking.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::models::{AlertView, DailyBucket};
use crate::domain::{BoundingBox, Quake, Rule};
use crate::error::HubError;

/// Schema, kept layout-compatible with the pre-existing `quakes.db` files:
/// three tables plus time/magnitude indexes and the unique index that makes
/// alert recording idempotent. Foreign keys are declared but enforcement is
/// left off (see [`Store::connect`]): alerts are append-only history and
/// must outlive their rule.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS quakes (
    id        TEXT PRIMARY KEY,
    time_ms   INTEGER NOT NULL,
    mag       REAL    NOT NULL,
    place     TEXT    NOT NULL,
    lon       REAL    NOT NULL,
    lat       REAL    NOT NULL,
    depth_km  REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS rules (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    min_mag REAL NOT NULL,
    bbox    TEXT
);

CREATE TABLE IF NOT EXISTS alerts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    quake_id   TEXT NOT NULL,
    rule_id    INTEGER NOT NULL,
    created_ms INTEGER NOT NULL,
    FOREIGN KEY(quake_id) REFERENCES quakes(id),
    FOREIGN KEY(rule_id)  REFERENCES rules(id)
);

CREATE INDEX IF NOT EXISTS idx_quakes_time ON quakes(time_ms DESC);
CREATE INDEX IF NOT EXISTS idx_quakes_mag  ON quakes(mag DESC);

CREATE UNIQUE INDEX IF NOT EXISTS uq_alert_quake_rule ON alerts(quake_id, rule_id);
";

/// SQLite-backed persistence layer using `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if missing) the database at `url` and applies the
    /// schema.
    ///
    /// WAL journal mode keeps concurrent readers off the writers' path.
    /// Foreign key enforcement stays off: deleting a rule must leave its
    /// historical alerts in place, and an in-flight cycle may record an
    /// alert for a rule deleted moments earlier.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] if the URL is invalid, the database
    /// cannot be opened, or the schema cannot be applied.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, HubError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| HubError::Storage(format!("invalid database url {url:?}: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| HubError::Storage(format!("connect failed: {e}")))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Opens a fresh in-memory store. Used by tests and ad-hoc
    /// experiments; a single connection keeps every query on the same
    /// in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] if the database cannot be opened.
    pub async fn memory() -> Result<Self, HubError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| HubError::Storage(format!("invalid memory url: {e}")))?
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| HubError::Storage(format!("connect failed: {e}")))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), HubError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::Storage(format!("schema init failed: {e}")))?;
        Ok(())
    }

    // ── quakes ──────────────────────────────────────────────────────────

    /// Insert-or-ignore a batch of quakes by primary key.
    ///
    /// Returns the number of rows newly inserted; duplicates are silently
    /// skipped, not errors. Each insert is its own atomic unit, so this is
    /// safe to call concurrently with itself and with reads.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn upsert_quakes(&self, quakes: &[Quake]) -> Result<u64, HubError> {
        let mut inserted = 0;
        for quake in quakes {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO quakes(id, time_ms, mag, place, lon, lat, depth_km) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&quake.id)
            .bind(quake.time_ms)
            .bind(quake.mag)
            .bind(&quake.place)
            .bind(quake.lon)
            .bind(quake.lat)
            .bind(quake.depth_km)
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::Storage(format!("upsert quake {}: {e}", quake.id)))?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// All quakes with `time_ms >= since_ms`, newest-first.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn list_quakes_since(&self, since_ms: i64) -> Result<Vec<Quake>, HubError> {
        let rows = sqlx::query_as::<_, (String, i64, f64, String, f64, f64, f64)>(
            "SELECT id, time_ms, mag, place, lon, lat, depth_km FROM quakes \
             WHERE time_ms >= ? ORDER BY time_ms DESC",
        )
        .bind(since_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("list quakes since: {e}")))?;

        Ok(rows.into_iter().map(quake_from_row).collect())
    }

    /// The most recent quakes, newest-first, bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn list_recent_quakes(&self, limit: u32) -> Result<Vec<Quake>, HubError> {
        let rows = sqlx::query_as::<_, (String, i64, f64, String, f64, f64, f64)>(
            "SELECT id, time_ms, mag, place, lon, lat, depth_km FROM quakes \
             ORDER BY time_ms DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("list recent quakes: {e}")))?;

        Ok(rows.into_iter().map(quake_from_row).collect())
    }

    // ── rules ───────────────────────────────────────────────────────────

    /// Persists a new rule and returns its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn create_rule(
        &self,
        name: &str,
        min_mag: f64,
        bbox: Option<&BoundingBox>,
    ) -> Result<i64, HubError> {
        let result = sqlx::query("INSERT INTO rules(name, min_mag, bbox) VALUES (?, ?, ?)")
            .bind(name)
            .bind(min_mag)
            .bind(bbox.map(ToString::to_string))
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::Storage(format!("create rule: {e}")))?;
        Ok(result.last_insert_rowid())
    }

    /// All rules, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure, or if a stored
    /// bounding box no longer parses (the store only ever writes validated
    /// boxes, so this indicates outside tampering).
    pub async fn list_rules(&self) -> Result<Vec<Rule>, HubError> {
        let rows = sqlx::query_as::<_, (i64, String, f64, Option<String>)>(
            "SELECT id, name, min_mag, bbox FROM rules ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("list rules: {e}")))?;

        rows.into_iter()
            .map(|(id, name, min_mag, bbox)| {
                let bbox = bbox
                    .map(|s| {
                        s.parse::<BoundingBox>().map_err(|e| {
                            HubError::Storage(format!("rule {id} has corrupt bbox: {e}"))
                        })
                    })
                    .transpose()?;
                Ok(Rule {
                    id,
                    name,
                    min_mag,
                    bbox,
                })
            })
            .collect()
    }

    /// Deletes a rule by id. Returns `true` if a row was removed.
    ///
    /// Alerts referencing the rule are kept: they are append-only history,
    /// not a live join target.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn delete_rule(&self, id: i64) -> Result<bool, HubError> {
        let result = sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| HubError::Storage(format!("delete rule {id}: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ── alerts ──────────────────────────────────────────────────────────

    /// Records an alert for `(quake_id, rule_id)` at most once.
    ///
    /// Returns `true` if newly recorded, `false` if the pair already had
    /// an alert. Idempotency is enforced by the unique index in a single
    /// conflict-ignoring insert, never by checking first, which would
    /// race under concurrent cycles.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn record_alert(
        &self,
        quake_id: &str,
        rule_id: i64,
        created_ms: i64,
    ) -> Result<bool, HubError> {
        let result = sqlx::query(
            "INSERT INTO alerts(quake_id, rule_id, created_ms) VALUES (?, ?, ?) \
             ON CONFLICT(quake_id, rule_id) DO NOTHING",
        )
        .bind(quake_id)
        .bind(rule_id)
        .bind(created_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("record alert {quake_id}/{rule_id}: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Recent alerts joined with their quake and rule snapshots,
    /// newest-first, bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn list_alerts(&self, limit: u32) -> Result<Vec<AlertView>, HubError> {
        #[allow(clippy::type_complexity)]
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                i64,
                String,
                i64,
                i64,
                f64,
                String,
                f64,
                f64,
                f64,
                String,
                f64,
                Option<String>,
            ),
        >(
            "SELECT a.id, a.created_ms, a.quake_id, a.rule_id, \
                    q.time_ms, q.mag, q.place, q.lon, q.lat, q.depth_km, \
                    r.name, r.min_mag, r.bbox \
             FROM alerts a \
             JOIN quakes q ON q.id = a.quake_id \
             JOIN rules r  ON r.id = a.rule_id \
             ORDER BY a.created_ms DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("list alerts: {e}")))?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    id,
                    created_ms,
                    quake_id,
                    rule_id,
                    time_ms,
                    mag,
                    place,
                    lon,
                    lat,
                    depth_km,
                    rule_name,
                    min_mag,
                    bbox,
                )| AlertView {
                    id,
                    created_ms,
                    quake_id,
                    rule_id,
                    time_ms,
                    mag,
                    place,
                    lon,
                    lat,
                    depth_km,
                    rule_name,
                    min_mag,
                    bbox,
                },
            )
            .collect())
    }

    // ── reports ─────────────────────────────────────────────────────────

    /// Quake activity grouped by UTC calendar day
    /// (`date(time_ms/1000,'unixepoch')`), most recent day first, bounded
    /// to `days` rows.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Storage`] on database failure.
    pub async fn daily_report(&self, days: u32) -> Result<Vec<DailyBucket>, HubError> {
        let rows = sqlx::query_as::<_, (String, i64, f64, f64)>(
            "SELECT date(time_ms/1000,'unixepoch') AS day, \
                    COUNT(*) AS n, \
                    ROUND(AVG(mag),2) AS avg_mag, \
                    ROUND(MAX(mag),2) AS max_mag \
             FROM quakes \
             GROUP BY day \
             ORDER BY day DESC \
             LIMIT ?",
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HubError::Storage(format!("daily report: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(day, count, avg_mag, max_mag)| DailyBucket {
                day,
                count,
                avg_mag,
                max_mag,
            })
            .collect())
    }
}

fn quake_from_row(row: (String, i64, f64, String, f64, f64, f64)) -> Quake {
    let (id, time_ms, mag, place, lon, lat, depth_km) = row;
    Quake {
        id,
        time_ms,
        mag,
        place,
        lon,
        lat,
        depth_km,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn store() -> Store {
        let Ok(store) = Store::memory().await else {
            panic!("memory store failed");
        };
        store
    }

    fn quake(id: &str, time_ms: i64, mag: f64) -> Quake {
        Quake {
            id: id.to_string(),
            time_ms,
            mag,
            place: format!("near {id}"),
            lon: -121.5,
            lat: 37.5,
            depth_km: 10.0,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = store().await;
        let batch = vec![quake("us1", 1_000, 1.0), quake("us2", 2_000, 2.0)];

        let first = store.upsert_quakes(&batch).await;
        assert!(matches!(first, Ok(2)));

        let second = store.upsert_quakes(&batch).await;
        assert!(matches!(second, Ok(0)));

        let Ok(all) = store.list_recent_quakes(10).await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn first_write_wins_on_duplicate_id() {
        let store = store().await;
        let _ = store.upsert_quakes(&[quake("us1", 1_000, 1.0)]).await;
        let _ = store.upsert_quakes(&[quake("us1", 9_000, 9.0)]).await;

        let Ok(all) = store.list_recent_quakes(10).await else {
            panic!("list failed");
        };
        assert_eq!(all.first().map(|q| q.mag), Some(1.0));
    }

    #[tokio::test]
    async fn list_since_is_inclusive_and_newest_first() {
        let store = store().await;
        let batch = vec![
            quake("a", 1_000, 1.0),
            quake("b", 2_000, 2.0),
            quake("c", 3_000, 3.0),
        ];
        let _ = store.upsert_quakes(&batch).await;

        let Ok(since) = store.list_quakes_since(2_000).await else {
            panic!("list failed");
        };
        let ids: Vec<&str> = since.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn recent_quakes_respect_limit() {
        let store = store().await;
        let batch: Vec<Quake> = (0..5)
            .map(|i| quake(&format!("q{i}"), i64::from(i) * 1_000, 1.0))
            .collect();
        let _ = store.upsert_quakes(&batch).await;

        let Ok(recent) = store.list_recent_quakes(2).await else {
            panic!("list failed");
        };
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().map(|q| q.id.as_str()), Some("q4"));
    }

    #[tokio::test]
    async fn rule_ids_increase_and_list_is_descending() {
        let store = store().await;
        let Ok(first) = store.create_rule("one", 1.0, None).await else {
            panic!("create failed");
        };
        let Ok(second) = store.create_rule("two", 2.0, None).await else {
            panic!("create failed");
        };
        assert!(second > first);

        let Ok(rules) = store.list_rules().await else {
            panic!("list failed");
        };
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn bbox_round_trips_through_storage() {
        let store = store().await;
        let Ok(bbox) = "-114,42,-125,32".parse::<BoundingBox>() else {
            panic!("parse failed");
        };
        let _ = store.create_rule("west", 3.0, Some(&bbox)).await;

        let Ok(rules) = store.list_rules().await else {
            panic!("list failed");
        };
        assert_eq!(rules.first().and_then(|r| r.bbox), Some(bbox));
    }

    #[tokio::test]
    async fn delete_rule_reports_removal() {
        let store = store().await;
        let Ok(id) = store.create_rule("gone", 1.0, None).await else {
            panic!("create failed");
        };
        assert!(matches!(store.delete_rule(id).await, Ok(true)));
        assert!(matches!(store.delete_rule(id).await, Ok(false)));
    }

    #[tokio::test]
    async fn record_alert_is_exactly_once() {
        let store = store().await;
        let _ = store.upsert_quakes(&[quake("us1", 1_000, 3.0)]).await;
        let Ok(rule_id) = store.create_rule("r", 1.0, None).await else {
            panic!("create failed");
        };

        assert!(matches!(store.record_alert("us1", rule_id, 5_000).await, Ok(true)));
        // Same pair, different timestamp: still a no-op.
        assert!(matches!(store.record_alert("us1", rule_id, 6_000).await, Ok(false)));

        let Ok(alerts) = store.list_alerts(10).await else {
            panic!("list failed");
        };
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts.first().map(|a| a.created_ms), Some(5_000));
    }

    #[tokio::test]
    async fn alert_view_carries_quake_and_rule_snapshots() {
        let store = store().await;
        let _ = store.upsert_quakes(&[quake("us1", 1_000, 3.2)]).await;
        let Ok(bbox) = "-125,32,-114,42".parse::<BoundingBox>() else {
            panic!("parse failed");
        };
        let Ok(rule_id) = store.create_rule("CA 3+", 3.0, Some(&bbox)).await else {
            panic!("create failed");
        };
        let _ = store.record_alert("us1", rule_id, 5_000).await;

        let Ok(alerts) = store.list_alerts(10).await else {
            panic!("list failed");
        };
        let Some(view) = alerts.first() else {
            panic!("expected one alert");
        };
        assert_eq!(view.quake_id, "us1");
        assert_eq!(view.mag, 3.2);
        assert_eq!(view.rule_name, "CA 3+");
        assert_eq!(view.bbox.as_deref(), Some("-125,32,-114,42"));
    }

    #[tokio::test]
    async fn alerts_survive_rule_deletion_but_leave_the_view() {
        let store = store().await;
        let _ = store.upsert_quakes(&[quake("us1", 1_000, 3.0)]).await;
        let Ok(rule_id) = store.create_rule("r", 1.0, None).await else {
            panic!("create failed");
        };
        let _ = store.record_alert("us1", rule_id, 5_000).await;
        let _ = store.delete_rule(rule_id).await;

        // The join view no longer shows it, but re-recording is still a
        // duplicate: the underlying alert row was kept.
        let Ok(alerts) = store.list_alerts(10).await else {
            panic!("list failed");
        };
        assert!(alerts.is_empty());
        assert!(matches!(store.record_alert("us1", rule_id, 7_000).await, Ok(false)));
    }

    #[tokio::test]
    async fn daily_report_groups_by_utc_day() {
        let store = store().await;
        // 2023-11-14 22:13:20 UTC and 2023-11-15 02:00:00 UTC.
        let batch = vec![
            quake("a", 1_700_000_000_000, 2.0),
            quake("b", 1_700_013_600_000, 4.0),
            quake("c", 1_700_013_700_000, 3.0),
        ];
        let _ = store.upsert_quakes(&batch).await;

        let Ok(report) = store.daily_report(7).await else {
            panic!("report failed");
        };
        assert_eq!(report.len(), 2);
        let Some(newest) = report.first() else {
            panic!("expected rows");
        };
        assert_eq!(newest.day, "2023-11-15");
        assert_eq!(newest.count, 2);
        assert_eq!(newest.avg_mag, 3.5);
        assert_eq!(newest.max_mag, 4.0);
    }

    #[tokio::test]
    async fn daily_report_respects_day_limit() {
        let store = store().await;
        let day_ms = 86_400_000;
        let batch: Vec<Quake> = (0..5)
            .map(|i| quake(&format!("q{i}"), 1_700_000_000_000 + i64::from(i) * day_ms, 1.0))
            .collect();
        let _ = store.upsert_quakes(&batch).await;

        let Ok(report) = store.daily_report(3).await else {
            panic!("report failed");
        };
        assert_eq!(report.len(), 3);
    }
}
