//! Event — an immutable record that a subscriber was persisted.
//!
//! Published after every successful persist so that the provisioning step
//! can run with the lifecycle phase the persist was made in.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::subscriber::{CreationPhase, Subscriber};
use crate::time::{Timestamp, now};

/// A subscriber was created or updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberEvent {
    pub id: EventId,
    pub phase: CreationPhase,
    pub subscriber: Subscriber,
    pub timestamp: Timestamp,
}

impl SubscriberEvent {
    #[must_use]
    pub fn new(phase: CreationPhase, subscriber: Subscriber) -> Self {
        Self {
            id: EventId::new(),
            phase,
            subscriber,
            timestamp: now(),
        }
    }
}
