//! Player roster poller.

use std::sync::Arc;
use std::time::Duration;

use crate::correlator::CommandOutcome;
use crate::dispatch::CommandRunner;
use crate::domain::{EventKind, EventSink, SessionEvent, SessionRegistry};
use crate::router::patterns::PATTERNS;

use super::diff::diff;

pub const PLAYERS_INTERVAL: Duration = Duration::from_secs(60);

const ROSTER_COMMAND: &str = "Users";

/// Header echoed before the names by the roster command.
const ROSTER_HEADER: &str = "<slot:\"name\">";

/// Polls the player roster and emits joined/left deltas.
pub struct PlayerPoller {
    registry: Arc<dyn SessionRegistry>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn EventSink>,
}

impl PlayerPoller {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            runner,
            sink,
        }
    }

    /// Run one poll cycle for the session.
    pub async fn poll(&self, session_id: &str) {
        let Some(session) = self.registry.get(session_id).await else {
            return;
        };
        if !session.is_running() {
            return;
        }

        let outcome = self.runner.run(&session, ROSTER_COMMAND).await;
        let CommandOutcome::Output(body) = outcome else {
            if !session.silenced {
                tracing::warn!("player poll on session '{}' got no roster", session_id);
            }
            return;
        };
        let players = parse_roster(&body);

        // Re-fetch before mutating; another task may have updated the
        // snapshot while the command was in flight.
        let Some(mut session) = self.registry.get(session_id).await else {
            return;
        };
        let delta = diff(&session.players, &players);
        for name in &delta.joined {
            self.sink
                .emit(SessionEvent::new(
                    session_id,
                    EventKind::PlayerJoined { name: name.clone() },
                ))
                .await;
        }
        for name in &delta.left {
            self.sink
                .emit(SessionEvent::new(
                    session_id,
                    EventKind::PlayerLeft { name: name.clone() },
                ))
                .await;
        }
        self.sink
            .emit(SessionEvent::new(
                session_id,
                EventKind::PlayerListUpdated {
                    players: players.clone(),
                    joined: delta.joined,
                    left: delta.left,
                },
            ))
            .await;

        session.players = players;
        self.registry.update(session).await;
    }
}

/// Extract player names from the roster output: every quoted token after
/// the header is stripped. Only the header itself is discarded, so a
/// player actually named `name` stays in the roster.
fn parse_roster(body: &str) -> Vec<String> {
    let body = body.replacen(ROSTER_HEADER, "", 1);
    PATTERNS
        .quoted
        .captures_iter(&body)
        .map(|caps| caps[1].to_string())
        .collect()
}
