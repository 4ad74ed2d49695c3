//! Command transport implementations.

pub mod http;

pub use http::HttpCommandTransport;
