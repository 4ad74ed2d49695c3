//! Event sink trait.
//!
//! Domain events are pushed, never pulled: the router and pollers hand each
//! event to the sink and move on. Delivery guarantees are the sink's
//! concern (the in-process implementation fans out to channel subscribers).

use async_trait::async_trait;

use super::event::SessionEvent;

/// Consumer-facing push interface for domain events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one event. Must not fail: sinks drop events they cannot
    /// deliver.
    async fn emit(&self, event: SessionEvent);
}
