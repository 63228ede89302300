//! Domain layer: core types, rule matching, and the event bus.
//!
//! This module contains the hub's domain model: normalized quake records,
//! user-defined alerting rules with their pure matcher, the notification
//! payloads, and the bounded event bus that fans them out to observers.

pub mod event_bus;
pub mod notification;
pub mod quake;
pub mod rule;

pub use event_bus::EventBus;
pub use notification::{Notification, NotificationKind, RuleRef};
pub use quake::Quake;
pub use rule::{BoundingBox, Rule};
