//! Upstream feed retrieval and normalization.
//!
//! The feed client fetches a GeoJSON feature collection over HTTP and
//! normalizes each feature independently; everything malformed is contained
//! here as a per-record drop, so the pipeline only ever sees clean
//! [`crate::domain::Quake`] batches or a fatal fetch error.

pub mod client;
pub mod normalize;

pub use client::{FeedClient, known_feeds, resolve_feed};
pub use normalize::DropReason;
