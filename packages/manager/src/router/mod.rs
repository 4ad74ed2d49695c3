//! Console log router.
//!
//! Entry point for raw console batches arriving on the push channel. Each
//! batch is split into timestamped lines; every line is first checked
//! against the in-flight command registry (the correlation step) and then
//! decoded into domain events. The two steps are independent: a line that
//! resolves a command may still emit an event.

pub mod classifier;
pub mod patterns;

use std::sync::Arc;

use crate::correlator::{CommandCorrelator, CommandOutcome};
use crate::domain::session::HISTORY_CONSUMED_FLAG;
use crate::domain::{EventSink, SessionEvent, SessionRegistry};

use classifier::classify;
use patterns::{is_save_line, split_log_line, PATTERNS};

/// Routes console batches to the correlator and the event sink.
pub struct EventRouter {
    registry: Arc<dyn SessionRegistry>,
    correlator: Arc<CommandCorrelator>,
    sink: Arc<dyn EventSink>,
}

impl EventRouter {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        correlator: Arc<CommandCorrelator>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            correlator,
            sink,
        }
    }

    /// Process one raw console batch for a session.
    ///
    /// Never returns an error to the push channel: unknown sessions and
    /// malformed lines are dropped with at most a log line.
    pub async fn handle_console_batch(&self, session_id: &str, raw: &str) {
        let Some(session) = self.registry.get(session_id).await else {
            tracing::warn!("console batch for unknown session '{}'", session_id);
            return;
        };

        let lines: Vec<&str> = raw
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return;
        }

        // The connection replays a backlog of historical lines on attach.
        // The first non-empty batch is that backlog: discard it wholesale
        // and only flip the consumed flag.
        if !session.has_flag(HISTORY_CONSUMED_FLAG) {
            let mut session = session;
            session.flags.insert(HISTORY_CONSUMED_FLAG.to_string());
            self.registry.update(session).await;
            tracing::debug!(
                "discarded {} historical lines for session '{}'",
                lines.len(),
                session_id
            );
            return;
        }

        // Command whose "executing" marker was seen earlier in this batch,
        // used as a fallback when the server echoes output under a
        // different timestamp than the marker.
        let mut open_command: Option<String> = None;

        for line in lines {
            let Some((timestamp, content)) = split_log_line(line) else {
                continue;
            };

            // Correlation bookkeeping. The marker line is excluded from
            // response matching below, otherwise its own freshly stamped
            // timestamp would match it; domain decoding still sees it.
            let mut is_marker = false;
            if let Some(caps) = PATTERNS.executing.captures(content) {
                let command = &caps[1];
                if self.correlator.stamp_timestamp(session_id, command, timestamp) {
                    open_command = Some(command.to_string());
                }
                is_marker = true;
            }

            // Save noise is emitted around the same instant as command
            // output and must not be mistaken for it.
            if !is_marker && !is_save_line(content) {
                if let Some(record) = self.correlator.take_queued(session_id, timestamp) {
                    tracing::debug!(
                        "resolved '{}' for session '{}' by timestamp",
                        record.command,
                        session_id
                    );
                    record.resolve(CommandOutcome::Output(content.to_string()));
                } else if let Some(command) = open_command.take() {
                    if let Some(record) = self.correlator.take(session_id, &command) {
                        tracing::debug!(
                            "resolved '{}' for session '{}' by open marker",
                            record.command,
                            session_id
                        );
                        record.resolve(CommandOutcome::Output(content.to_string()));
                    }
                }
            }

            for kind in classify(content) {
                self.sink.emit(SessionEvent::new(session_id, kind)).await;
            }
        }
    }
}
