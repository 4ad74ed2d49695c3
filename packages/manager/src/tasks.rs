//! Per-session background task registry.
//!
//! Poller loops and flag-expiry timers are plain tokio tasks; this registry
//! keeps their handles keyed by session and task name so session removal
//! can abort everything that still references the session.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::task::JoinHandle;

/// Named background tasks grouped by session id.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    inner: Mutex<HashMap<String, HashMap<String, JoinHandle<()>>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under (session, name). A previous task with the
    /// same name is aborted and replaced.
    pub fn register(&self, session_id: &str, name: &str, handle: JoinHandle<()>) {
        let mut inner = self.inner.lock().expect("task registry mutex poisoned");
        let tasks = inner.entry(session_id.to_string()).or_default();
        if let Some(previous) = tasks.insert(name.to_string(), handle) {
            previous.abort();
        }
    }

    /// Abort and drop the named task, if present.
    pub fn abort(&self, session_id: &str, name: &str) {
        let mut inner = self.inner.lock().expect("task registry mutex poisoned");
        if let Some(tasks) = inner.get_mut(session_id) {
            if let Some(handle) = tasks.remove(name) {
                handle.abort();
            }
        }
    }

    /// Abort every task of the session. Called on session removal so no
    /// timer or poller outlives the session it references.
    pub fn abort_all(&self, session_id: &str) {
        let mut inner = self.inner.lock().expect("task registry mutex poisoned");
        if let Some(tasks) = inner.remove(session_id) {
            for (name, handle) in tasks {
                tracing::debug!("aborting task '{}' of session '{}'", name, session_id);
                handle.abort();
            }
        }
    }

    #[cfg(test)]
    pub fn count(&self, session_id: &str) -> usize {
        let inner = self.inner.lock().expect("task registry mutex poisoned");
        inner.get(session_id).map_or(0, |tasks| tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn parked_task(finished: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            finished.store(true, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_all_stops_every_session_task() {
        // given: two parked tasks for one session
        let registry = TaskRegistry::new();
        let finished = Arc::new(AtomicBool::new(false));
        registry.register("alpha", "players", parked_task(finished.clone()));
        registry.register("alpha", "radio", parked_task(finished.clone()));
        assert_eq!(registry.count("alpha"), 2);

        // when:
        registry.abort_all("alpha");

        // then: the timers never complete even after their deadline
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(registry.count("alpha"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_replaces_task_with_same_name() {
        // given:
        let registry = TaskRegistry::new();
        let first_finished = Arc::new(AtomicBool::new(false));
        registry.register("alpha", "debris-flag", parked_task(first_finished.clone()));

        // when: a new task takes over the same slot
        let second_finished = Arc::new(AtomicBool::new(false));
        registry.register("alpha", "debris-flag", parked_task(second_finished.clone()));

        // then: only the replacement runs to completion
        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert!(!first_finished.load(Ordering::SeqCst));
        assert!(second_finished.load(Ordering::SeqCst));
        assert_eq!(registry.count("alpha"), 1);
    }

    #[tokio::test]
    async fn test_abort_on_unknown_session_is_a_no_op() {
        let registry = TaskRegistry::new();
        registry.abort("ghost", "players");
        registry.abort_all("ghost");
    }
}
