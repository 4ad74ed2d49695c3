//! Debris flag poller.
//!
//! Destroyed Bradley APCs and patrol helicopters leave gib entities on the
//! map for a while. The poller looks them up by entity marker; a fresh
//! finding sets a session flag, emits the timed-event start and arms a
//! flag-expiry timer. While the flag is set, further findings are the same
//! observation and stay quiet; after expiry the next finding re-arms.

use std::sync::Arc;
use std::time::Duration;

use crate::correlator::CommandOutcome;
use crate::dispatch::CommandRunner;
use crate::domain::{EventKind, EventSink, SessionEvent, SessionRegistry, TimedEvent};
use crate::tasks::TaskRegistry;

pub const DEBRIS_INTERVAL: Duration = Duration::from_secs(60);

/// How long a debris flag stays set after a finding.
pub const DEBRIS_FLAG_TTL: Duration = Duration::from_secs(600);

/// (entity marker, session flag, event) per debris kind.
const DEBRIS_LOOKUPS: &[(&str, &str, TimedEvent)] = &[
    (
        "servergibs_bradley",
        "bradley-debris",
        TimedEvent::BradleyDebris,
    ),
    (
        "servergibs_patrolhelicopter",
        "heli-debris",
        TimedEvent::HeliDebris,
    ),
];

/// Polls for battle debris and maintains the auto-expiring session flags.
pub struct DebrisPoller {
    registry: Arc<dyn SessionRegistry>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn EventSink>,
    tasks: Arc<TaskRegistry>,
}

impl DebrisPoller {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn EventSink>,
        tasks: Arc<TaskRegistry>,
    ) -> Self {
        Self {
            registry,
            runner,
            sink,
            tasks,
        }
    }

    /// Run one poll cycle for the session, one lookup per debris kind.
    pub async fn poll(&self, session_id: &str) {
        for &(marker, flag, event) in DEBRIS_LOOKUPS {
            self.poll_marker(session_id, marker, flag, event).await;
        }
    }

    async fn poll_marker(&self, session_id: &str, marker: &str, flag: &str, event: TimedEvent) {
        let Some(session) = self.registry.get(session_id).await else {
            return;
        };
        if !session.is_running() {
            return;
        }

        let command = format!("find_entity {}", marker);
        let outcome = self.runner.run(&session, &command).await;
        let CommandOutcome::Output(body) = outcome else {
            if !session.silenced {
                tracing::warn!(
                    "debris lookup '{}' on session '{}' got no listing",
                    marker,
                    session_id
                );
            }
            return;
        };
        if !body.contains(marker) {
            return;
        }

        let Some(mut session) = self.registry.get(session_id).await else {
            return;
        };
        if session.has_flag(flag) {
            return;
        }
        session.flags.insert(flag.to_string());
        self.registry.update(session).await;
        self.sink
            .emit(SessionEvent::new(
                session_id,
                EventKind::TimedEventStarted { event },
            ))
            .await;
        self.arm_flag_expiry(session_id, flag);
    }

    /// Schedule the flag clear; registered with the task registry so
    /// session removal cancels it.
    fn arm_flag_expiry(&self, session_id: &str, flag: &str) {
        let registry = self.registry.clone();
        let session_id_owned = session_id.to_string();
        let flag_owned = flag.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBRIS_FLAG_TTL).await;
            let Some(mut session) = registry.get(&session_id_owned).await else {
                return;
            };
            if session.flags.remove(&flag_owned) {
                tracing::debug!(
                    "flag '{}' expired on session '{}'",
                    flag_owned,
                    session_id_owned
                );
                registry.update(session).await;
            }
        });
        self.tasks.register(session_id, flag, handle);
    }
}
