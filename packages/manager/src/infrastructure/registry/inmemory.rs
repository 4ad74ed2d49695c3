//! In-memory session registry.
//!
//! A `HashMap` behind an async mutex is the only storage this system needs:
//! all session state is in-memory and lost on restart by design.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Session, SessionRegistry};

/// In-memory `SessionRegistry` implementation.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn get(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.lock().await;
        sessions.get(id).cloned()
    }

    async fn insert(&self, session: Session) {
        let mut sessions = self.sessions.lock().await;
        tracing::debug!("session '{}' registered", session.id);
        sessions.insert(session.id.clone(), session);
    }

    async fn update(&self, session: Session) {
        // Same operation as insert: replace the snapshot wholesale.
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.clone(), session);
    }

    async fn remove(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(id);
        if removed.is_some() {
            tracing::debug!("session '{}' removed", id);
        }
        removed
    }

    async fn ids(&self) -> Vec<String> {
        let sessions = self.sessions.lock().await;
        sessions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ServerRef, SessionStatus};

    fn test_session(id: &str) -> Session {
        Session::new(
            id,
            ServerRef {
                public_id: 100,
                internal_id: 9001,
            },
            "eu",
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_returns_snapshot_copy() {
        // given:
        let registry = InMemorySessionRegistry::new();
        registry.insert(test_session("alpha")).await;

        // when:
        let mut copy = registry.get("alpha").await.unwrap();
        copy.status = SessionStatus::Running;

        // then: mutating the copy does not affect the stored snapshot
        let stored = registry.get("alpha").await.unwrap();
        assert_eq!(stored.status, SessionStatus::Unknown);
    }

    #[tokio::test]
    async fn test_update_replaces_snapshot_last_writer_wins() {
        // given:
        let registry = InMemorySessionRegistry::new();
        registry.insert(test_session("alpha")).await;

        let mut a = registry.get("alpha").await.unwrap();
        let mut b = registry.get("alpha").await.unwrap();

        // when: two stale copies race; the later update wins wholesale
        a.players = vec!["Alice".to_string()];
        registry.update(a).await;
        b.frequencies = vec![4765];
        registry.update(b).await;

        // then:
        let stored = registry.get("alpha").await.unwrap();
        assert!(stored.players.is_empty());
        assert_eq!(stored.frequencies, vec![4765]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = InMemorySessionRegistry::new();
        registry.insert(test_session("alpha")).await;

        assert!(registry.remove("alpha").await.is_some());
        assert!(registry.remove("alpha").await.is_none());
        assert!(registry.get("alpha").await.is_none());
    }

    #[tokio::test]
    async fn test_ids_lists_all_sessions() {
        let registry = InMemorySessionRegistry::new();
        registry.insert(test_session("alpha")).await;
        registry.insert(test_session("beta")).await;

        let mut ids = registry.ids().await;
        ids.sort();
        assert_eq!(ids, vec!["alpha".to_string(), "beta".to_string()]);
    }
}
