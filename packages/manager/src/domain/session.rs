//! Session snapshot and its value types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Flag set once the first (historical) console batch has been consumed.
pub const HISTORY_CONSUMED_FLAG: &str = "history-consumed";

/// Transport-level server reference: the public ID callers know the server
/// by, and the internal ID the hosting API resolves it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRef {
    pub public_id: u64,
    pub internal_id: u64,
}

/// Lifecycle status reported by the hosting provider.
///
/// Only `Running` is operationally significant: commands are refused and
/// pollers skip their cycle in every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
    Unknown,
}

/// Enable flags for the three periodic pollers of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    pub players: bool,
    pub radio: bool,
    pub debris: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            players: true,
            radio: true,
            debris: true,
        }
    }
}

/// One managed remote game-server connection and its cached state.
///
/// Sessions are plain data snapshots owned by the [`SessionRegistry`]:
/// callers fetch a copy, mutate it, and write it back through `update`
/// (last-writer-wins). The periodic-task handles belong to the manager's
/// task registry, not to this snapshot.
///
/// [`SessionRegistry`]: super::registry::SessionRegistry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Caller-assigned unique identifier.
    pub id: String,
    pub server: ServerRef,
    pub region: String,
    pub status: SessionStatus,
    /// Last known player roster, in server order.
    pub players: Vec<String>,
    /// Active radio broadcast frequencies.
    pub frequencies: Vec<u32>,
    /// Short-lived string flags (history consumed, time-boxed debris flags).
    pub flags: HashSet<String>,
    /// Suppresses warning-level notifications for this session.
    pub silenced: bool,
    pub pollers: PollerConfig,
    /// Opaque state bag reserved for caller metadata.
    pub metadata: serde_json::Value,
}

impl Session {
    /// Create a new session in `Unknown` status with empty cached state.
    pub fn new(id: impl Into<String>, server: ServerRef, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            server,
            region: region.into(),
            status: SessionStatus::Unknown,
            players: Vec::new(),
            frequencies: Vec::new(),
            flags: HashSet::new(),
            silenced: false,
            pollers: PollerConfig::default(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Whether the session accepts commands.
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}
