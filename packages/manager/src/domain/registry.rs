//! Session registry trait.
//!
//! The domain layer defines the storage interface it needs; the
//! infrastructure layer provides the concrete implementation (dependency
//! inversion). All mutation goes through `update`, which replaces the
//! stored snapshot wholesale: callers must re-fetch before mutating, or
//! they lose updates (last-writer-wins).

use async_trait::async_trait;

use super::session::Session;

/// Storage interface for session snapshots.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Fetch a copy of the session snapshot.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Register a new session. Replaces any existing snapshot with the
    /// same id.
    async fn insert(&self, session: Session);

    /// Replace the stored snapshot for the session's id (last-writer-wins).
    async fn update(&self, session: Session);

    /// Remove and return the session.
    async fn remove(&self, id: &str) -> Option<Session>;

    /// Identifiers of all registered sessions.
    async fn ids(&self) -> Vec<String>;
}
