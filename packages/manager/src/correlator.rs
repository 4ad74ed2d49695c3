//! In-flight command registry.
//!
//! The request channel gives no request/response pairing primitive, so the
//! dispatcher registers every response-awaiting command here and the log
//! router matches later console lines back to it by timestamp. Records are
//! keyed by (session id, exact command text): at most one unresolved record
//! may exist per key, a second identical `add` is refused.
//!
//! The map is guarded by a `std::sync::Mutex` and every method completes
//! without awaiting, so each router or dispatcher task step observes and
//! mutates a record atomically. Resolution consumes the record, which makes
//! double-resolve unrepresentable.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Terminal result of a dispatched command.
///
/// A timed-out command is not a failure: absence of output is the normal
/// result for fire-and-forget console commands.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A console line was correlated to the command.
    Output(String),
    /// No output appeared before the response timeout.
    NoOutput,
    /// The command was never delivered, with a descriptive reason.
    Failed(String),
}

/// One response-awaiting command between dispatch and resolution.
#[derive(Debug)]
pub struct PendingCommand {
    pub session_id: String,
    pub command: String,
    /// Timestamp of the matching "executing" marker, stamped at most once.
    pub pending_timestamp: Option<String>,
    resolver: oneshot::Sender<CommandOutcome>,
    timeout: Option<JoinHandle<()>>,
}

impl PendingCommand {
    /// Create a record plus the receiver the dispatcher awaits.
    pub fn new(
        session_id: impl Into<String>,
        command: impl Into<String>,
    ) -> (Self, oneshot::Receiver<CommandOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                session_id: session_id.into(),
                command: command.into(),
                pending_timestamp: None,
                resolver: tx,
                timeout: None,
            },
            rx,
        )
    }

    /// Resolve the command, aborting its timeout first so a stale timer
    /// cannot fire after explicit resolution. Consumes the record.
    pub fn resolve(self, outcome: CommandOutcome) {
        if let Some(handle) = self.timeout {
            handle.abort();
        }
        // The dispatcher may have given up (e.g. the caller dropped the
        // future); a closed receiver is not an error here.
        let _ = self.resolver.send(outcome);
    }
}

type Key = (String, String);

/// Registry of in-flight commands, shared between the dispatcher and the
/// log router.
#[derive(Debug, Default)]
pub struct CommandCorrelator {
    inner: Mutex<HashMap<Key, PendingCommand>>,
}

impl CommandCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record. Returns false (and drops nothing) if a record
    /// with the same (session, command) key already exists; the caller is
    /// responsible for not double-dispatching.
    pub fn add(&self, record: PendingCommand) -> bool {
        let mut inner = self.inner.lock().expect("correlator mutex poisoned");
        let key = (record.session_id.clone(), record.command.clone());
        if inner.contains_key(&key) {
            return false;
        }
        inner.insert(key, record);
        true
    }

    /// Whether an in-flight record exists for the exact key.
    pub fn contains(&self, session_id: &str, command: &str) -> bool {
        let inner = self.inner.lock().expect("correlator mutex poisoned");
        inner.contains_key(&(session_id.to_string(), command.to_string()))
    }

    /// Attach the response timeout handle, used right after dispatch.
    pub fn attach_timeout(&self, session_id: &str, command: &str, handle: JoinHandle<()>) {
        let mut inner = self.inner.lock().expect("correlator mutex poisoned");
        if let Some(record) = inner.get_mut(&(session_id.to_string(), command.to_string())) {
            record.timeout = Some(handle);
        } else {
            // The record resolved between send and attach; the timer is
            // useless now.
            handle.abort();
        }
    }

    /// Stamp the "executing" marker timestamp onto the record, first write
    /// only. Returns whether the stamp was applied.
    pub fn stamp_timestamp(&self, session_id: &str, command: &str, timestamp: &str) -> bool {
        let mut inner = self.inner.lock().expect("correlator mutex poisoned");
        match inner.get_mut(&(session_id.to_string(), command.to_string())) {
            Some(record) if record.pending_timestamp.is_none() => {
                record.pending_timestamp = Some(timestamp.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove the record with the exact key, if any.
    pub fn take(&self, session_id: &str, command: &str) -> Option<PendingCommand> {
        let mut inner = self.inner.lock().expect("correlator mutex poisoned");
        inner.remove(&(session_id.to_string(), command.to_string()))
    }

    /// Remove the session's record whose stamped timestamp exactly equals
    /// `timestamp`. This is the core matching rule between a dispatched
    /// command and an unlabeled console line.
    pub fn take_queued(&self, session_id: &str, timestamp: &str) -> Option<PendingCommand> {
        let mut inner = self.inner.lock().expect("correlator mutex poisoned");
        let key = inner
            .iter()
            .find(|((sid, _), record)| {
                sid == session_id && record.pending_timestamp.as_deref() == Some(timestamp)
            })
            .map(|(key, _)| key.clone())?;
        inner.remove(&key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("correlator mutex poisoned").len()
    }
}
