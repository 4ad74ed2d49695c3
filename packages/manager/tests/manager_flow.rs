//! End-to-end flow over the public manager surface: session lifecycle,
//! command correlation against the console stream, and event delivery to
//! subscribers.

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use gamewarden_manager::correlator::CommandOutcome;
use gamewarden_manager::domain::{
    CommandTransport, EventKind, PollerConfig, ServerRef, Session, SessionStatus, TransportError,
};
use gamewarden_manager::manager::SessionManager;

/// Transport stub accepting every command and recording it.
#[derive(Default)]
struct RecordingTransport {
    commands: Mutex<Vec<String>>,
}

#[async_trait]
impl CommandTransport for RecordingTransport {
    async fn send_console_command(
        &self,
        _server: &ServerRef,
        _region: &str,
        command: &str,
    ) -> Result<(), TransportError> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(())
    }
}

fn quiet_session(id: &str) -> Session {
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

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| gamewarden_shared::logger::setup_logger("manager_flow", "debug"));
}

async fn ready_manager(transport: Arc<RecordingTransport>) -> Arc<SessionManager> {
    init_logging();
    let manager = Arc::new(SessionManager::new(transport));
    manager.add_session(quiet_session("alpha")).await;
    manager
        .handle_status_change("alpha", SessionStatus::Running)
        .await;
    // first batch is historical backlog, consumed without events
    manager
        .handle_console_output("alpha", "05/17/2024 11:59:00: old backlog line")
        .await;
    manager
}

#[tokio::test]
async fn test_command_resolves_from_console_stream() {
    // given: a running session past its bootstrap batch
    let transport = Arc::new(RecordingTransport::default());
    let manager = ready_manager(transport.clone()).await;

    // when: a command is dispatched and the console echoes marker + output
    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run_command("alpha", "Users").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    manager
        .handle_console_output(
            "alpha",
            "05/17/2024 12:00:00: Executing command: Users\n\
             05/17/2024 12:00:00: <slot:\"name\">\"Alice\"",
        )
        .await;

    // then: the caller got the correlated line, the transport one request
    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Output("<slot:\"name\">\"Alice\"".to_string())
    );
    assert_eq!(
        transport.commands.lock().unwrap().as_slice(),
        ["Users".to_string()]
    );
}

#[tokio::test]
async fn test_live_console_lines_reach_subscribers_as_events() {
    // given:
    let transport = Arc::new(RecordingTransport::default());
    let manager = ready_manager(transport).await;
    let mut events = manager.subscribe().await;

    // when: a live kill line arrives on the push channel
    manager
        .handle_console_output("alpha", "05/17/2024 12:00:05: Alice was killed by bear")
        .await;

    // then: subscribers receive the decoded event
    let event = events.recv().await.unwrap();
    assert_eq!(event.session_id, "alpha");
    assert!(matches!(event.kind, EventKind::PlayerKill { .. }));
}

#[tokio::test]
async fn test_server_info_decodes_correlated_response() {
    // given:
    let transport = Arc::new(RecordingTransport::default());
    let manager = ready_manager(transport).await;

    // when: serverinfo is requested and the console echoes its JSON body
    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.server_info("alpha").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let payload = concat!(
        r#"{"Hostname":"Test Server","MaxPlayers":100,"Players":42,"#,
        r#""Queued":0,"Joining":1,"EntityCount":132154,"#,
        r#""GameTime":"06/15/2024 14:22:10","Uptime":86400,"#,
        r#""Map":"Procedural Map","Framerate":58.5,"Memory":4096,"#,
        r#""Collections":180,"NetworkIn":12345,"NetworkOut":54321,"#,
        r#""Restarting":false,"SaveCreatedTime":"06/10/2024 00:00:00"}"#
    );
    manager
        .handle_console_output(
            "alpha",
            &format!(
                "05/17/2024 12:00:00: Executing command: serverinfo\n\
                 05/17/2024 12:00:00: {}",
                payload
            ),
        )
        .await;

    // then:
    let info = pending.await.unwrap().unwrap();
    assert_eq!(info.hostname, "Test Server");
    assert_eq!(info.players, 42);
    assert_eq!(info.map, "Procedural Map");
}

#[tokio::test]
async fn test_removed_session_ignores_console_output() {
    // given:
    let transport = Arc::new(RecordingTransport::default());
    let manager = ready_manager(transport).await;
    let mut events = manager.subscribe().await;

    // when: the session is removed and more output arrives
    assert!(manager.remove_session("alpha").await.is_some());
    manager
        .handle_console_output("alpha", "05/17/2024 12:00:05: Alice was killed by bear")
        .await;

    // then: no session state, no events
    assert!(manager.session("alpha").await.is_none());
    assert!(events.try_recv().is_err());
}
