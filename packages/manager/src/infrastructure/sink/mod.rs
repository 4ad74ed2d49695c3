//! Event sink implementations.

pub mod channel;

pub use channel::ChannelEventSink;
