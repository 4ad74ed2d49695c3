//! Channel-based event sink.
//!
//! Fans every emitted event out to all live subscribers over unbounded
//! mpsc channels. Subscribers that dropped their receiver are pruned on
//! the next emit.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::domain::{EventSink, SessionEvent};

/// `EventSink` implementation backed by unbounded mpsc channels.
#[derive(Default)]
pub struct ChannelEventSink {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>,
}

impl ChannelEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiving end.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers.lock().await;
        subscribers.push(tx);
        rx
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: SessionEvent) {
        let mut subscribers = self.subscribers.lock().await;
        // send() fails only when the receiver is gone; drop those senders
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if subscribers.is_empty() {
            tracing::trace!("event emitted with no live subscribers: {:?}", event.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventKind;

    fn test_event(session_id: &str) -> SessionEvent {
        SessionEvent::new(
            session_id,
            EventKind::Respawn {
                name: "Alice".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_emit_fans_out_to_all_subscribers() {
        // given:
        let sink = ChannelEventSink::new();
        let mut rx1 = sink.subscribe().await;
        let mut rx2 = sink.subscribe().await;

        // when:
        sink.emit(test_event("alpha")).await;

        // then:
        assert_eq!(rx1.recv().await.unwrap().session_id, "alpha");
        assert_eq!(rx2.recv().await.unwrap().session_id, "alpha");
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        // given:
        let sink = ChannelEventSink::new();
        let rx1 = sink.subscribe().await;
        let mut rx2 = sink.subscribe().await;
        drop(rx1);

        // when: the dead channel is dropped on emit, the live one delivers
        sink.emit(test_event("alpha")).await;

        // then:
        assert_eq!(rx2.recv().await.unwrap().session_id, "alpha");
        let subscribers = sink.subscribers.lock().await;
        assert_eq!(subscribers.len(), 1);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_a_no_op() {
        let sink = ChannelEventSink::new();
        sink.emit(test_event("alpha")).await;
    }
}
