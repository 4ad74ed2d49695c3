//! Compiled pattern rules and static lookup tables for the log decoder.
//!
//! The console stream has no formal grammar; these are the enumerated
//! patterns the classifier recognizes. Everything else is noise and is
//! silently dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::event::{ActorCategory, TimedEvent};

/// Literal separator of a player-kill line.
pub const KILL_SEPARATOR: &str = " was killed by ";

/// Prefix of server-event spawn lines checked against [`EVENT_MARKERS`].
pub const EVENT_PREFIX: &str = "[event]";

/// Ordered marker table for timed-event fan-out. Every entry whose key
/// appears as a substring of the line fires its own start event; matching
/// is containment, not mutual exclusion, so one line can fire several.
pub const EVENT_MARKERS: &[(&str, TimedEvent)] = &[
    ("cargo_plane", TimedEvent::Airdrop),
    ("cargo_ship", TimedEvent::CargoShip),
    ("ch47", TimedEvent::Chinook),
    ("patrolhelicopter", TimedEvent::PatrolHelicopter),
    ("halloween", TimedEvent::Halloween),
    ("christmas", TimedEvent::Christmas),
    ("easter", TimedEvent::Easter),
];

/// Static kill-participant table keyed by lower-cased identifier:
/// (identifier, display name, category).
pub const KILL_ACTORS: &[(&str, &str, ActorCategory)] = &[
    ("patrolhelicopter", "Patrol Helicopter", ActorCategory::Npc),
    ("bradleyapc", "Bradley APC", ActorCategory::Npc),
    ("autoturret_deployed", "Auto Turret", ActorCategory::Npc),
    ("guntrap.deployed", "Shotgun Trap", ActorCategory::Npc),
    ("flameturret.deployed", "Flame Turret", ActorCategory::Npc),
    ("landmine", "Landmine", ActorCategory::Npc),
    ("scientist", "Scientist", ActorCategory::Npc),
    ("zombie", "Zombie", ActorCategory::Npc),
    ("bear", "Bear", ActorCategory::Other),
    ("polarbear", "Polar Bear", ActorCategory::Other),
    ("wolf", "Wolf", ActorCategory::Other),
    ("boar", "Boar", ActorCategory::Other),
    ("stag", "Stag", ActorCategory::Other),
    ("chicken", "Chicken", ActorCategory::Other),
    ("shark", "Shark", ActorCategory::Other),
    ("fall", "Fall", ActorCategory::Other),
    ("drowned", "Drowning", ActorCategory::Other),
    ("hunger", "Hunger", ActorCategory::Other),
    ("thirst", "Thirst", ActorCategory::Other),
    ("cold", "Cold", ActorCategory::Other),
];

/// The compiled pattern set. Built once via [`PATTERNS`].
pub struct LogPatterns {
    /// `MM/DD/YYYY HH:MM:SS: content`
    pub log_line: Regex,
    /// Command echo emitted when the server starts executing a command.
    pub executing: Regex,
    pub suicide: Regex,
    pub respawn: Regex,
    pub chat: Regex,
    pub role_added: Regex,
    pub role_removed: Regex,
    pub zone_created: Regex,
    pub zone_removed: Regex,
    pub note_edited: Regex,
    pub team_created: Regex,
    pub team_joined: Regex,
    pub team_invited: Regex,
    pub team_invite_cancelled: Regex,
    pub team_left: Regex,
    pub team_promoted: Regex,
    pub kit_spawned: Regex,
    pub kit_given: Regex,
    pub special_event: Regex,
    pub vending_renamed: Regex,
    /// `[<freq> MHz] Position: (x, y, z), Range: r`
    pub broadcast: Regex,
    /// Quoted tokens of the player roster output.
    pub quoted: Regex,
}

impl LogPatterns {
    fn new() -> Self {
        Self {
            log_line: Regex::new(r"^(\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}): (.*)$").unwrap(),
            executing: Regex::new(r"^Executing command: (.+)$").unwrap(),
            suicide: Regex::new(r"^(.+?)\[\d+/\d+\] was suicide by Suicide$").unwrap(),
            respawn: Regex::new(r"^(.+?)\[\d+/\d+\] has spawned$").unwrap(),
            chat: Regex::new(r"^\[CHAT\] (.+?)\[\d+/\d+\] : (.+)$").unwrap(),
            role_added: Regex::new(r"^Added (.+?) to role (.+)$").unwrap(),
            role_removed: Regex::new(r"^Removed (.+?) from role (.+)$").unwrap(),
            zone_created: Regex::new(r"^Zone (.+?) was created$").unwrap(),
            zone_removed: Regex::new(r"^Zone (.+?) was removed$").unwrap(),
            note_edited: Regex::new(r"^(.+?) edited a note: (.*)$").unwrap(),
            team_created: Regex::new(r"^(.+?) created a team, id: (\d+)$").unwrap(),
            team_joined: Regex::new(r"^(.+?) joined a team, id: (\d+)$").unwrap(),
            team_invited: Regex::new(r"^(.+?) invited (.+?) to a team, id: (\d+)$").unwrap(),
            team_invite_cancelled: Regex::new(r"^(.+?) cancelled an invite for (.+?), id: (\d+)$")
                .unwrap(),
            team_left: Regex::new(r"^(.+?) left a team, id: (\d+)$").unwrap(),
            team_promoted: Regex::new(r"^(.+?) promoted (.+?) to team leader, id: (\d+)$").unwrap(),
            kit_spawned: Regex::new(r"^(.+?) spawned with kit (.+)$").unwrap(),
            kit_given: Regex::new(r"^(.+?) was given kit (.+)$").unwrap(),
            special_event: Regex::new(r"^Event set as: (.+)$").unwrap(),
            vending_renamed: Regex::new(r#"^(.+?) renamed vending machine from "(.*)" to "(.*)"$"#)
                .unwrap(),
            broadcast: Regex::new(
                r"^\[(\d+) MHz\] Position: \((-?[\d.]+), (-?[\d.]+), (-?[\d.]+)\), Range: (\d+)$",
            )
            .unwrap(),
            quoted: Regex::new(r#""([^"]*)""#).unwrap(),
        }
    }
}

/// The shared compiled pattern set.
pub static PATTERNS: Lazy<LogPatterns> = Lazy::new(LogPatterns::new);

/// Strip a raw line to its `(timestamp, content)` pair. Lines that do not
/// match the fixed log-line pattern are dropped by the caller.
pub fn split_log_line(line: &str) -> Option<(&str, &str)> {
    let caps = PATTERNS.log_line.captures(line)?;
    // get(1)/get(2) always exist when the pattern matches
    Some((
        caps.get(1).map(|m| m.as_str())?,
        caps.get(2).map(|m| m.as_str())?,
    ))
}

/// Whether the content is server save noise, which is excluded from the
/// timestamp-equality matching rule (the server emits it around the same
/// instant as command output).
pub fn is_save_line(content: &str) -> bool {
    content.starts_with("[ SAVE ]") || content.starts_with("Saving")
}
