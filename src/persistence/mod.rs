//! Persistence layer: SQLite-backed storage for quakes, rules, and alerts.
//!
//! Provides the injected [`Store`] handle the pipeline and handlers share.
//! Dedup and alert idempotency are enforced here, at the storage layer,
//! with atomic conflict-ignoring inserts.

pub mod models;
pub mod store;

pub use models::{AlertView, DailyBucket};
pub use store::Store;
