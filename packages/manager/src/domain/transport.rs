//! Outbound command transport trait and its error taxonomy.
//!
//! The push channel (console log stream) and authentication are external
//! collaborators; this trait covers the single outbound primitive the core
//! needs: delivering one console command to a server.

use async_trait::async_trait;

use thiserror::Error;

use super::session::ServerRef;

/// Failures of the outbound command request.
///
/// None of these are raised to library callers as panics or bare errors;
/// the dispatcher folds them into `CommandOutcome::Failed(reason)`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No access token is available for the request
    #[error("no access token available")]
    NoAccessToken,

    /// The request could not be delivered (network-level failure)
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success HTTP status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered 2xx but explicitly reported not-OK
    #[error("server rejected command: {0}")]
    Rejected(String),
}

/// Delivery of one console command over the request channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Send `command` to the server's console. Success means the request
    /// was acknowledged by the hosting API, not that the command produced
    /// output.
    async fn send_console_command(
        &self,
        server: &ServerRef,
        region: &str,
        command: &str,
    ) -> Result<(), TransportError>;
}
