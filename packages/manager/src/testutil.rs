//! Shared test doubles.

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::correlator::CommandOutcome;
use crate::dispatch::CommandRunner;
use crate::domain::{EventSink, ServerRef, Session, SessionEvent, SessionStatus};

/// Sink collecting every emitted event in order.
#[derive(Default)]
pub struct CollectingSink {
    pub events: Mutex<Vec<SessionEvent>>,
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn emit(&self, event: SessionEvent) {
        self.events.lock().await.push(event);
    }
}

/// Runner answering from a fixed queue of outcomes, recording each command.
#[derive(Default)]
pub struct StubRunner {
    outcomes: StdMutex<VecDeque<CommandOutcome>>,
    pub calls: StdMutex<Vec<String>>,
}

impl StubRunner {
    pub fn with_outcomes(outcomes: impl IntoIterator<Item = CommandOutcome>) -> Self {
        Self {
            outcomes: StdMutex::new(outcomes.into_iter().collect()),
            calls: StdMutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for StubRunner {
    async fn run(&self, _session: &Session, command: &str) -> CommandOutcome {
        self.calls.lock().unwrap().push(command.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CommandOutcome::NoOutput)
    }
}

pub fn running_session(id: &str) -> Session {
    let mut session = Session::new(
        id,
        ServerRef {
            public_id: 100,
            internal_id: 9001,
        },
        "eu",
    );
    session.status = SessionStatus::Running;
    session
}
