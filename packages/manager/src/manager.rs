//! Session manager: the public surface gluing the layers together.
//!
//! Owns the registry, the dispatcher, the log router and the poller loops.
//! Callers add and remove sessions, push console batches and status
//! changes in, issue commands, and subscribe to the resulting event
//! stream.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::correlator::{CommandCorrelator, CommandOutcome};
use crate::dispatch::{CommandDispatcher, DispatchError};
use crate::domain::{
    CommandTransport, EventSink, Session, SessionEvent, SessionRegistry, SessionStatus,
};
use crate::infrastructure::registry::InMemorySessionRegistry;
use crate::infrastructure::sink::ChannelEventSink;
use crate::poller::{
    DebrisPoller, PlayerPoller, RadioPoller, DEBRIS_INTERVAL, PLAYERS_INTERVAL, RADIO_INTERVAL,
};
use crate::router::EventRouter;
use crate::tasks::TaskRegistry;

const SERVER_INFO_COMMAND: &str = "serverinfo";

/// Failures of the public command surface.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("unknown session '{0}'")]
    UnknownSession(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("command produced no output")]
    EmptyResponse,

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("malformed server info payload: {0}")]
    MalformedServerInfo(#[from] serde_json::Error),
}

/// Decoded `serverinfo` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerInfo {
    pub hostname: String,
    pub max_players: u32,
    pub players: u32,
    pub queued: u32,
    pub joining: u32,
    pub entity_count: u64,
    pub game_time: String,
    pub uptime: u64,
    pub map: String,
    pub framerate: f32,
    pub memory: u64,
    pub collections: u64,
    pub network_in: u64,
    pub network_out: u64,
    pub restarting: bool,
    pub save_created_time: String,
}

/// Manages remote game-server sessions end to end.
pub struct SessionManager {
    registry: Arc<dyn SessionRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    router: EventRouter,
    sink: Arc<ChannelEventSink>,
    tasks: Arc<TaskRegistry>,
    players: Arc<PlayerPoller>,
    radio: Arc<RadioPoller>,
    debris: Arc<DebrisPoller>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
        let sink = Arc::new(ChannelEventSink::new());
        let event_sink: Arc<dyn EventSink> = sink.clone();
        let correlator = Arc::new(CommandCorrelator::new());
        let dispatcher = Arc::new(CommandDispatcher::new(correlator.clone(), transport));
        let tasks = Arc::new(TaskRegistry::new());
        let router = EventRouter::new(registry.clone(), correlator, event_sink.clone());
        let players = Arc::new(PlayerPoller::new(
            registry.clone(),
            dispatcher.clone(),
            event_sink.clone(),
        ));
        let radio = Arc::new(RadioPoller::new(
            registry.clone(),
            dispatcher.clone(),
            event_sink.clone(),
        ));
        let debris = Arc::new(DebrisPoller::new(
            registry.clone(),
            dispatcher.clone(),
            event_sink,
            tasks.clone(),
        ));
        Self {
            registry,
            dispatcher,
            router,
            sink,
            tasks,
            players,
            radio,
            debris,
        }
    }

    /// Register a session and start its enabled poller loops.
    pub async fn add_session(&self, session: Session) {
        let id = session.id.clone();
        let config = session.pollers;
        self.registry.insert(session).await;
        tracing::info!("session '{}' added", id);

        if config.players {
            let poller = self.players.clone();
            let session_id = id.clone();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::time::sleep(PLAYERS_INTERVAL).await;
                    poller.poll(&session_id).await;
                }
            });
            self.tasks.register(&id, "players-poller", handle);
        }
        if config.radio {
            let poller = self.radio.clone();
            let session_id = id.clone();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::time::sleep(RADIO_INTERVAL).await;
                    poller.poll(&session_id).await;
                }
            });
            self.tasks.register(&id, "radio-poller", handle);
        }
        if config.debris {
            let poller = self.debris.clone();
            let session_id = id.clone();
            let handle = tokio::spawn(async move {
                loop {
                    tokio::time::sleep(DEBRIS_INTERVAL).await;
                    poller.poll(&session_id).await;
                }
            });
            self.tasks.register(&id, "debris-poller", handle);
        }
    }

    /// Tear down a session: abort its pollers and flag timers, drop it
    /// from the registry. In-flight commands resolve via their timeouts.
    pub async fn remove_session(&self, id: &str) -> Option<Session> {
        self.tasks.abort_all(id);
        let removed = self.registry.remove(id).await;
        if removed.is_some() {
            tracing::info!("session '{}' removed", id);
        }
        removed
    }

    /// Push-channel callback: one raw console batch for a session.
    pub async fn handle_console_output(&self, id: &str, raw: &str) {
        self.router.handle_console_batch(id, raw).await;
    }

    /// Service-status callback from the hosting provider.
    pub async fn handle_status_change(&self, id: &str, status: SessionStatus) {
        let Some(mut session) = self.registry.get(id).await else {
            tracing::warn!("status change for unknown session '{}'", id);
            return;
        };
        if session.status != status {
            tracing::info!("session '{}' status: {:?} -> {:?}", id, session.status, status);
        }
        session.status = status;
        self.registry.update(session).await;
    }

    /// Run a command and wait for its correlated outcome.
    pub async fn run_command(&self, id: &str, command: &str) -> Result<CommandOutcome, ManagerError> {
        use crate::dispatch::CommandRunner;

        let session = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| ManagerError::UnknownSession(id.to_string()))?;
        Ok(self.dispatcher.run(&session, command).await)
    }

    /// Deliver a command without waiting for output.
    pub async fn send_command(&self, id: &str, command: &str) -> Result<(), ManagerError> {
        let session = self
            .registry
            .get(id)
            .await
            .ok_or_else(|| ManagerError::UnknownSession(id.to_string()))?;
        self.dispatcher.send(&session, command).await?;
        Ok(())
    }

    /// Fetch and decode the server's `serverinfo` report.
    pub async fn server_info(&self, id: &str) -> Result<ServerInfo, ManagerError> {
        match self.run_command(id, SERVER_INFO_COMMAND).await? {
            CommandOutcome::Output(body) => Ok(serde_json::from_str(&body)?),
            CommandOutcome::NoOutput => Err(ManagerError::EmptyResponse),
            CommandOutcome::Failed(reason) => Err(ManagerError::CommandFailed(reason)),
        }
    }

    /// Fetch a copy of the session snapshot.
    pub async fn session(&self, id: &str) -> Option<Session> {
        self.registry.get(id).await
    }

    /// Identifiers of all managed sessions.
    pub async fn session_ids(&self) -> Vec<String> {
        self.registry.ids().await
    }

    /// Subscribe to the outgoing domain event stream.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.sink.subscribe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::transport::MockCommandTransport;
    use crate::domain::{PollerConfig, ServerRef};
    use crate::testutil::running_session;

    fn manager_without_transport_calls() -> SessionManager {
        let mut transport = MockCommandTransport::new();
        transport.expect_send_console_command().times(0);
        SessionManager::new(Arc::new(transport))
    }

    fn session_without_pollers(id: &str) -> Session {
        let mut session = Session::new(
            id,
            ServerRef {
                public_id: 100,
                internal_id: 9001,
            },
            "eu",
        );
        session.pollers = PollerConfig {
            players: false,
            radio: false,
            debris: false,
        };
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_session_spawns_enabled_poller_loops() {
        // given:
        let manager = manager_without_transport_calls();

        // when: all pollers enabled (the default config)
        manager.add_session(running_session("alpha")).await;

        // then: three loops registered, none has ticked yet
        assert_eq!(manager.tasks.count("alpha"), 3);
        assert!(manager.session("alpha").await.is_some());
    }

    #[tokio::test]
    async fn test_add_session_honors_disabled_pollers() {
        let manager = manager_without_transport_calls();

        manager.add_session(session_without_pollers("alpha")).await;

        assert_eq!(manager.tasks.count("alpha"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_session_aborts_tasks_and_forgets_state() {
        // given:
        let manager = manager_without_transport_calls();
        manager.add_session(running_session("alpha")).await;

        // when:
        let removed = manager.remove_session("alpha").await;

        // then: session gone, loops aborted before their first tick
        assert!(removed.is_some());
        assert!(manager.session("alpha").await.is_none());
        assert_eq!(manager.tasks.count("alpha"), 0);
        tokio::time::sleep(PLAYERS_INTERVAL * 2).await;
    }

    #[tokio::test]
    async fn test_status_change_updates_snapshot() {
        // given:
        let manager = manager_without_transport_calls();
        manager.add_session(session_without_pollers("alpha")).await;

        // when:
        manager
            .handle_status_change("alpha", SessionStatus::Running)
            .await;

        // then:
        let session = manager.session("alpha").await.unwrap();
        assert!(session.is_running());

        // and: unknown sessions are ignored
        manager
            .handle_status_change("ghost", SessionStatus::Running)
            .await;
    }

    #[tokio::test]
    async fn test_commands_to_unknown_sessions_fail() {
        let manager = manager_without_transport_calls();

        let run = manager.run_command("ghost", "Users").await;
        assert!(matches!(run, Err(ManagerError::UnknownSession(_))));

        let send = manager.send_command("ghost", "say hi").await;
        assert!(matches!(send, Err(ManagerError::UnknownSession(_))));
    }

    #[test]
    fn test_server_info_decodes_pascal_case_payload() {
        let body = r#"{
            "Hostname": "Test Server",
            "MaxPlayers": 100,
            "Players": 42,
            "Queued": 0,
            "Joining": 1,
            "EntityCount": 132154,
            "GameTime": "06/15/2024 14:22:10",
            "Uptime": 86400,
            "Map": "Procedural Map",
            "Framerate": 58.5,
            "Memory": 4096,
            "Collections": 180,
            "NetworkIn": 12345,
            "NetworkOut": 54321,
            "Restarting": false,
            "SaveCreatedTime": "06/10/2024 00:00:00"
        }"#;

        let info: ServerInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.hostname, "Test Server");
        assert_eq!(info.max_players, 100);
        assert_eq!(info.players, 42);
        assert!(!info.restarting);
    }
}
