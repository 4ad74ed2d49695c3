//! Derived-state pollers.
//!
//! The console stream never announces roster, radio or debris changes on
//! its own; these routines poll for snapshots on fixed intervals, diff
//! them against the stored session state and emit the deltas as events.
//! Every poller follows the same shape: skip unless the session is
//! running, issue a response-awaiting command, warn and skip the cycle on
//! a missing response, otherwise re-fetch the session, diff, emit,
//! persist.

pub mod debris;
pub mod diff;
pub mod players;
pub mod radio;

pub use debris::{DebrisPoller, DEBRIS_FLAG_TTL, DEBRIS_INTERVAL};
pub use diff::{diff, PopulationDelta};
pub use players::{PlayerPoller, PLAYERS_INTERVAL};
pub use radio::{RadioPoller, RADIO_INTERVAL};
