//! Bounded in-process fan-out of operational notifications.
//!
//! [`EventBus`] keeps the most recent notifications in a fixed-capacity
//! ring buffer for [`EventBus::tail`], and forwards every publish through a
//! [`tokio::sync::broadcast`] channel so live observers (the SSE stream)
//! block on new data instead of polling. Neither side is durable: a process
//! restart loses bus history, not alert history.
//!
//! Producers never block on consumers. The ring evicts its oldest entry on
//! overflow, and lagging broadcast receivers skip entries once the channel
//! wraps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::broadcast;

use super::Notification;

/// Broadcast bus with a bounded replay ring.
#[derive(Debug, Clone)]
pub struct EventBus {
    ring: Arc<Mutex<VecDeque<Notification>>>,
    capacity: usize,
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Creates a new `EventBus`. `capacity` bounds both the replay ring and
    /// the broadcast channel (default used by callers: 1000).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            ring: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            sender,
        }
    }

    /// Publishes a notification, stamping a receive timestamp if the
    /// producer did not set one.
    ///
    /// Returns the number of live broadcast receivers that got the
    /// notification. With no active receivers the broadcast side is a
    /// silent drop; the ring retains the entry either way.
    pub fn publish(&self, mut notification: Notification) -> usize {
        if notification.ts_ms.is_none() {
            notification.ts_ms = Some(Utc::now().timestamp_millis());
        }

        {
            let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(notification.clone());
        }

        self.sender.send(notification).unwrap_or(0)
    }

    /// Returns the most recent `n` notifications in chronological order
    /// (or fewer, if the ring holds less).
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<Notification> {
        let ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = ring.len().saturating_sub(n);
        ring.iter().skip(skip).cloned().collect()
    }

    /// Creates a new receiver that will receive all future notifications.
    ///
    /// Each SSE connection calls this once on connect.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Returns the current number of active broadcast receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
