//! Event bus port — announces persisted subscribers.

use std::future::Future;

use accessline_domain::error::AccessLineError;
use accessline_domain::event::SubscriberEvent;

/// Publishes subscriber events to interested listeners.
pub trait EventPublisher {
    /// Publish an event to all current listeners.
    fn publish(
        &self,
        event: SubscriberEvent,
    ) -> impl Future<Output = Result<(), AccessLineError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: SubscriberEvent,
    ) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        (**self).publish(event)
    }
}
