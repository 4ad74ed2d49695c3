//! Command dispatch and the response timeout policy.
//!
//! The dispatcher owns the write side of the correlation protocol: it
//! registers the in-flight record before the request goes out (the server
//! can echo the marker faster than the HTTP response returns), sends the
//! command, arms the response timeout and awaits resolution by the log
//! router or the timer, whichever comes first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::correlator::{CommandCorrelator, CommandOutcome, PendingCommand};
use crate::domain::{CommandTransport, Session, TransportError};

/// How long a dispatched command waits for correlated output before it
/// resolves as `NoOutput`.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Failures of fire-and-forget delivery.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("session '{0}' is not running")]
    NotRunning(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Response-awaiting command execution, as consumed by the pollers.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` on the session's server and wait for its outcome.
    async fn run(&self, session: &Session, command: &str) -> CommandOutcome;
}

/// Dispatches commands over the transport and correlates their responses.
pub struct CommandDispatcher {
    correlator: Arc<CommandCorrelator>,
    transport: Arc<dyn CommandTransport>,
}

impl CommandDispatcher {
    pub fn new(correlator: Arc<CommandCorrelator>, transport: Arc<dyn CommandTransport>) -> Self {
        Self {
            correlator,
            transport,
        }
    }

    /// Deliver `command` without correlation. Success means the request was
    /// acknowledged, nothing more.
    pub async fn send(&self, session: &Session, command: &str) -> Result<(), DispatchError> {
        if !session.is_running() {
            if !session.silenced {
                tracing::warn!(
                    "refusing command '{}': session '{}' is not running",
                    command,
                    session.id
                );
            }
            return Err(DispatchError::NotRunning(session.id.clone()));
        }
        self.transport
            .send_console_command(&session.server, &session.region, command)
            .await?;
        Ok(())
    }

    fn arm_timeout(&self, session_id: &str, command: &str) {
        let correlator = self.correlator.clone();
        let session_id_owned = session_id.to_string();
        let command_text = command.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(RESPONSE_TIMEOUT).await;
            if let Some(record) = correlator.take(&session_id_owned, &command_text) {
                tracing::debug!(
                    "command '{}' on session '{}' produced no output",
                    command_text,
                    session_id_owned
                );
                record.resolve(CommandOutcome::NoOutput);
            }
        });
        self.correlator.attach_timeout(session_id, command, handle);
    }
}

#[async_trait]
impl CommandRunner for CommandDispatcher {
    async fn run(&self, session: &Session, command: &str) -> CommandOutcome {
        if !session.is_running() {
            if !session.silenced {
                tracing::warn!(
                    "refusing command '{}': session '{}' is not running",
                    command,
                    session.id
                );
            }
            return CommandOutcome::Failed("session not running".to_string());
        }

        // Register before sending: the marker can hit the log stream
        // before the HTTP response comes back.
        let (record, rx) = PendingCommand::new(&session.id, command);
        if !self.correlator.add(record) {
            tracing::warn!(
                "command '{}' already in flight on session '{}'",
                command,
                session.id
            );
            return CommandOutcome::Failed("command already in flight".to_string());
        }

        if let Err(e) = self
            .transport
            .send_console_command(&session.server, &session.region, command)
            .await
        {
            // Undeliverable: drop the record, nothing will ever resolve it.
            self.correlator.take(&session.id, command);
            return CommandOutcome::Failed(e.to_string());
        }

        self.arm_timeout(&session.id, command);

        match rx.await {
            Ok(outcome) => outcome,
            // The record vanished without resolution; treat as no output.
            Err(_) => CommandOutcome::NoOutput,
        }
    }
}
