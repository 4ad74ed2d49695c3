//! Log line classifier.
//!
//! Pure functions that decode one log line's content into zero or more
//! typed domain events. Matching is best-effort: unmatched content yields
//! an empty vector, and the matchers are independent of each other. The
//! same line may resolve a command in the router and still emit an event
//! here.

use crate::domain::event::{ActorCategory, EventKind, KillActor};

use super::patterns::{EVENT_MARKERS, EVENT_PREFIX, KILL_ACTORS, KILL_SEPARATOR, PATTERNS};

/// Decode one line's content into domain events.
pub fn classify(content: &str) -> Vec<EventKind> {
    let mut events = Vec::new();
    let p = &*PATTERNS;

    if let Some(c) = p.suicide.captures(content) {
        events.push(EventKind::Suicide {
            name: c[1].to_string(),
        });
    }
    if let Some(c) = p.respawn.captures(content) {
        events.push(EventKind::Respawn {
            name: c[1].to_string(),
        });
    }
    if let Some(c) = p.chat.captures(content) {
        events.push(EventKind::Chat {
            name: c[1].to_string(),
            message: c[2].to_string(),
        });
    }
    if let Some(c) = p.role_added.captures(content) {
        events.push(EventKind::RoleAdded {
            name: c[1].to_string(),
            role: c[2].to_string(),
        });
    }
    if let Some(c) = p.role_removed.captures(content) {
        events.push(EventKind::RoleRemoved {
            name: c[1].to_string(),
            role: c[2].to_string(),
        });
    }
    if let Some(c) = p.zone_created.captures(content) {
        events.push(EventKind::ZoneCreated {
            zone: c[1].to_string(),
        });
    }
    if let Some(c) = p.zone_removed.captures(content) {
        events.push(EventKind::ZoneRemoved {
            zone: c[1].to_string(),
        });
    }
    if let Some(c) = p.note_edited.captures(content) {
        events.push(EventKind::NoteEdited {
            name: c[1].to_string(),
            text: c[2].to_string(),
        });
    }
    if let Some(c) = p.team_created.captures(content) {
        events.push(EventKind::TeamCreated {
            name: c[1].to_string(),
            team_id: parse_team_id(&c[2]),
        });
    }
    if let Some(c) = p.team_joined.captures(content) {
        events.push(EventKind::TeamJoined {
            name: c[1].to_string(),
            team_id: parse_team_id(&c[2]),
        });
    }
    if let Some(c) = p.team_invited.captures(content) {
        events.push(EventKind::TeamInvited {
            name: c[1].to_string(),
            invitee: c[2].to_string(),
            team_id: parse_team_id(&c[3]),
        });
    }
    if let Some(c) = p.team_invite_cancelled.captures(content) {
        events.push(EventKind::TeamInviteCancelled {
            name: c[1].to_string(),
            invitee: c[2].to_string(),
            team_id: parse_team_id(&c[3]),
        });
    }
    if let Some(c) = p.team_left.captures(content) {
        events.push(EventKind::TeamLeft {
            name: c[1].to_string(),
            team_id: parse_team_id(&c[2]),
        });
    }
    if let Some(c) = p.team_promoted.captures(content) {
        events.push(EventKind::TeamPromoted {
            name: c[1].to_string(),
            promoted: c[2].to_string(),
            team_id: parse_team_id(&c[3]),
        });
    }
    if let Some(c) = p.kit_spawned.captures(content) {
        events.push(EventKind::KitSpawned {
            name: c[1].to_string(),
            kit: c[2].to_string(),
        });
    }
    if let Some(c) = p.kit_given.captures(content) {
        events.push(EventKind::KitGiven {
            name: c[1].to_string(),
            kit: c[2].to_string(),
        });
    }
    if let Some(c) = p.special_event.captures(content) {
        events.push(EventKind::SpecialEventSet {
            event: c[1].to_string(),
        });
    }
    if let Some(c) = p.vending_renamed.captures(content) {
        events.push(EventKind::VendingRenamed {
            name: c[1].to_string(),
            from: c[2].to_string(),
            to: c[3].to_string(),
        });
    }

    // Timed-event fan-out: containment matching, deliberately without an
    // early exit, so one line can fire several entries.
    if content.starts_with(EVENT_PREFIX) {
        for (marker, event) in EVENT_MARKERS {
            if content.contains(marker) {
                events.push(EventKind::TimedEventStarted { event: *event });
            }
        }
    }

    if let Some((victim, killer)) = content.split_once(KILL_SEPARATOR) {
        events.push(EventKind::PlayerKill {
            victim: resolve_kill_actor(victim.trim()),
            killer: resolve_kill_actor(killer.trim()),
        });
    }

    events
}

/// Resolve one side of a kill line: static table by lower-cased identifier
/// first, purely numeric identifiers as generic NPCs, anything else as a
/// player named by the identifier itself.
pub fn resolve_kill_actor(token: &str) -> KillActor {
    let lowered = token.to_lowercase();
    if let Some((key, name, category)) = KILL_ACTORS.iter().find(|(key, _, _)| *key == lowered) {
        return KillActor {
            id: key.to_string(),
            name: name.to_string(),
            category: *category,
        };
    }
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return KillActor {
            id: token.to_string(),
            name: "NPC".to_string(),
            category: ActorCategory::Npc,
        };
    }
    KillActor {
        id: token.to_string(),
        name: token.to_string(),
        category: ActorCategory::Player,
    }
}

fn parse_team_id(digits: &str) -> u64 {
    // The pattern only captures ASCII digits; an overflowing id is clamped
    // rather than dropped.
    digits.parse().unwrap_or(u64::MAX)
}
