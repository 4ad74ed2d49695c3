//! Shared utilities for the Gamewarden workspace.
//!
//! Small crate holding the clock abstraction and logging setup used by the
//! manager library and by downstream binaries.

pub mod logger;
pub mod time;
