//! # quakehub
//!
//! Earthquake feed ingestion and alerting hub. Fetches GeoJSON quake
//! feeds, dedups them into SQLite, evaluates user-defined magnitude and
//! bounding-box rules against each new batch, and records exactly-once
//! alerts per (quake, rule) pair, with a web dashboard, a live SSE event
//! stream, and a Prometheus metrics endpoint on top.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, SSE, CLI)
//!     │
//!     ├── REST Handlers + Dashboard (api/)
//!     │
//!     ├── IngestService (service/)
//!     │       ├── FeedClient (feed/)
//!     │       ├── Rule matcher (domain/)
//!     │       └── EventBus (domain/)
//!     │
//!     └── Store, SQLite (persistence/)
//! ```
//!
//! The store is the only shared mutable resource; every mutation is a
//! single atomic statement, so concurrent ingest cycles need no further
//! coordination.

pub mod api;
pub mod app_state;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod persistence;
pub mod service;
