//! Radio frequency poller.

use std::sync::Arc;
use std::time::Duration;

use crate::correlator::CommandOutcome;
use crate::dispatch::CommandRunner;
use crate::domain::{EventKind, EventSink, SessionEvent, SessionRegistry, TimedEvent};
use crate::router::patterns::PATTERNS;

pub const RADIO_INTERVAL: Duration = Duration::from_secs(30);

const RADIO_COMMAND: &str = "rf.listboardcaster";

/// Frequencies reserved by the monument broadcasters.
const OIL_RIG_FREQUENCY: u32 = 4768;
const LARGE_OIL_RIG_FREQUENCY: u32 = 4765;

/// One active broadcaster from the radio listing.
#[derive(Debug, Clone, PartialEq)]
struct Broadcast {
    frequency: u32,
    x: f32,
    y: f32,
    z: f32,
    range: u32,
}

/// Polls active radio broadcasters and emits gained/lost frequencies.
pub struct RadioPoller {
    registry: Arc<dyn SessionRegistry>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn EventSink>,
}

impl RadioPoller {
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

        let outcome = self.runner.run(&session, RADIO_COMMAND).await;
        let CommandOutcome::Output(body) = outcome else {
            if !session.silenced {
                tracing::warn!("radio poll on session '{}' got no listing", session_id);
            }
            return;
        };
        let broadcasts = parse_broadcasts(&body);

        let Some(mut session) = self.registry.get(session_id).await else {
            return;
        };
        let new_frequencies: Vec<u32> = broadcasts.iter().map(|b| b.frequency).collect();

        for frequency in &session.frequencies {
            if !new_frequencies.contains(frequency) {
                self.sink
                    .emit(SessionEvent::new(
                        session_id,
                        EventKind::FrequencyLost {
                            frequency: *frequency,
                        },
                    ))
                    .await;
            }
        }
        for broadcast in &broadcasts {
            if session.frequencies.contains(&broadcast.frequency) {
                continue;
            }
            self.sink
                .emit(SessionEvent::new(
                    session_id,
                    EventKind::FrequencyGained {
                        frequency: broadcast.frequency,
                        x: broadcast.x,
                        y: broadcast.y,
                        z: broadcast.z,
                        range: broadcast.range,
                    },
                ))
                .await;
            // The two monument frequencies double as event observations.
            let timed = match broadcast.frequency {
                OIL_RIG_FREQUENCY => Some(TimedEvent::OilRig),
                LARGE_OIL_RIG_FREQUENCY => Some(TimedEvent::LargeOilRig),
                _ => None,
            };
            if let Some(event) = timed {
                self.sink
                    .emit(SessionEvent::new(
                        session_id,
                        EventKind::TimedEventStarted { event },
                    ))
                    .await;
            }
        }

        session.frequencies = new_frequencies;
        self.registry.update(session).await;
    }
}

fn parse_broadcasts(body: &str) -> Vec<Broadcast> {
    body.lines()
        .filter_map(|line| {
            let caps = PATTERNS.broadcast.captures(line.trim())?;
            Some(Broadcast {
                frequency: caps[1].parse().ok()?,
                x: caps[2].parse().ok()?,
                y: caps[3].parse().ok()?,
                z: caps[4].parse().ok()?,
                range: caps[5].parse().ok()?,
            })
        })
        .collect()
}
