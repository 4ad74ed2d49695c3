//! HTTP command transport.
//!
//! Sends console commands to the remote management API. Token refresh is
//! external: some other component keeps the slot current, this transport
//! only reads it. Requests hitting a transient gateway status are retried
//! a bounded number of times with linear backoff; anything else fails
//! straight through. Retries may duplicate a command on the server side,
//! which the correlation layer tolerates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::{CommandTransport, ServerRef, TransportError};

/// Attempts beyond the first request.
const MAX_RETRIES: u32 = 2;

/// Base delay of the linear backoff between retries.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Gateway statuses worth retrying.
fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

#[derive(Serialize)]
struct ConsoleCommandRequest<'a> {
    server_id: u64,
    region: &'a str,
    command: &'a str,
}

/// `CommandTransport` implementation over the remote management API.
pub struct HttpCommandTransport {
    client: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl HttpCommandTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: RwLock::new(None),
        }
    }

    /// Replace the bearer token. Called by the external auth component.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        let mut slot = self.access_token.write().await;
        *slot = Some(token.into());
    }

    pub async fn clear_access_token(&self) {
        let mut slot = self.access_token.write().await;
        *slot = None;
    }

    async fn post_once(
        &self,
        token: &str,
        body: &ConsoleCommandRequest<'_>,
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}/api/server/console-command", self.base_url);
        self.client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

#[async_trait]
impl CommandTransport for HttpCommandTransport {
    async fn send_console_command(
        &self,
        server: &ServerRef,
        region: &str,
        command: &str,
    ) -> Result<(), TransportError> {
        let token = {
            let slot = self.access_token.read().await;
            slot.clone().ok_or(TransportError::NoAccessToken)?
        };
        let body = ConsoleCommandRequest {
            server_id: server.internal_id,
            region,
            command,
        };

        let mut attempt = 0;
        loop {
            let response = self.post_once(&token, &body).await?;
            let status = response.status();

            if is_retryable(status) && attempt < MAX_RETRIES {
                attempt += 1;
                tracing::warn!(
                    "console command got {}, retrying ({}/{})",
                    status,
                    attempt,
                    MAX_RETRIES
                );
                tokio::time::sleep(RETRY_DELAY * attempt).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            // 2xx with an explicit not-OK body is still a rejection
            let body = response.text().await.unwrap_or_default();
            if !body.is_empty() && body.trim() != "OK" {
                return Err(TransportError::Rejected(body));
            }
            return Ok(());
        }
    }
}
