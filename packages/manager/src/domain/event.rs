//! Domain event taxonomy.
//!
//! Events are ephemeral notifications derived from raw log lines and poller
//! snapshots. They are pushed to the event sink and never stored. The serde
//! tag gives each kind a stable string identifier for subscribers.

use serde::{Deserialize, Serialize};

/// Category of a kill participant.
///
/// `Other` covers animals and environmental causes (fall, hunger, traps
/// resolve to `Npc` through the static table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorCategory {
    Player,
    Npc,
    Other,
}

/// One side of a player-kill line, resolved to an identifier, a display
/// name, and a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillActor {
    pub id: String,
    pub name: String,
    pub category: ActorCategory,
}

/// Server-wide timed events observed through the log stream or pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimedEvent {
    Airdrop,
    CargoShip,
    Chinook,
    PatrolHelicopter,
    Halloween,
    Christmas,
    Easter,
    OilRig,
    LargeOilRig,
    BradleyDebris,
    HeliDebris,
}

impl TimedEvent {
    /// Stable display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Airdrop => "Airdrop",
            Self::CargoShip => "Cargo Ship",
            Self::Chinook => "Chinook",
            Self::PatrolHelicopter => "Patrol Helicopter",
            Self::Halloween => "Halloween",
            Self::Christmas => "Christmas",
            Self::Easter => "Easter",
            Self::OilRig => "Oil Rig",
            Self::LargeOilRig => "Large Oil Rig",
            Self::BradleyDebris => "Bradley APC Debris",
            Self::HeliDebris => "Patrol Helicopter Debris",
        }
    }
}

/// The kind-specific payload of a domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventKind {
    PlayerJoined {
        name: String,
    },
    PlayerLeft {
        name: String,
    },
    PlayerListUpdated {
        players: Vec<String>,
        joined: Vec<String>,
        left: Vec<String>,
    },
    Suicide {
        name: String,
    },
    Respawn {
        name: String,
    },
    Chat {
        name: String,
        message: String,
    },
    RoleAdded {
        name: String,
        role: String,
    },
    RoleRemoved {
        name: String,
        role: String,
    },
    ZoneCreated {
        zone: String,
    },
    ZoneRemoved {
        zone: String,
    },
    NoteEdited {
        name: String,
        text: String,
    },
    TeamCreated {
        name: String,
        team_id: u64,
    },
    TeamJoined {
        name: String,
        team_id: u64,
    },
    TeamInvited {
        name: String,
        invitee: String,
        team_id: u64,
    },
    TeamInviteCancelled {
        name: String,
        invitee: String,
        team_id: u64,
    },
    TeamLeft {
        name: String,
        team_id: u64,
    },
    TeamPromoted {
        name: String,
        promoted: String,
        team_id: u64,
    },
    KitSpawned {
        name: String,
        kit: String,
    },
    KitGiven {
        name: String,
        kit: String,
    },
    SpecialEventSet {
        event: String,
    },
    TimedEventStarted {
        event: TimedEvent,
    },
    VendingRenamed {
        name: String,
        from: String,
        to: String,
    },
    FrequencyGained {
        frequency: u32,
        x: f32,
        y: f32,
        z: f32,
        range: u32,
    },
    FrequencyLost {
        frequency: u32,
    },
    PlayerKill {
        victim: KillActor,
        killer: KillActor,
    },
}

/// A domain event bound to the session it was observed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session_id: String,
    /// Wall-clock emission time, Unix milliseconds UTC.
    pub emitted_at_ms: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl SessionEvent {
    pub fn new(session_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            session_id: session_id.into(),
            emitted_at_ms: gamewarden_shared::time::now_utc_millis(),
            kind,
        }
    }
}
