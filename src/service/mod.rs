//! Service layer: the ingest pipeline orchestrator.

pub mod ingest;

pub use ingest::{AlertFired, IngestOutcome, IngestService};
