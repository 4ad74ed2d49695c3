//! Remote game-server session management library.
//!
//! This library drives sessions against a hosting provider that exposes two
//! decoupled channels per server: an HTTP request channel for administrative
//! commands and an asynchronous push channel delivering raw console log
//! text. It correlates issued commands with later unlabeled log output,
//! decodes the log stream into typed domain events, and runs periodic
//! pollers that diff server state snapshots into delta events.

// layers
pub mod domain;
pub mod infrastructure;

// core engine
pub mod correlator;
pub mod dispatch;
pub mod manager;
pub mod poller;
pub mod router;
pub mod tasks;

#[cfg(test)]
pub(crate) mod testutil;
