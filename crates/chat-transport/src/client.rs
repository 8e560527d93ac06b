//! HTTP relay client.

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the chat relay REST API.
///
/// The relay owns the platform session; this client only pulls updates and
/// pushes outbound messages. The access token is kept in a `SecretString`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl HttpTransport {
    /// Create a new relay client.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: SecretString::new(token.into()),
        })
    }

    /// Check if the relay is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Fetch updates with an id greater than or equal to `offset`.
    #[instrument(skip(self))]
    pub async fn updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        let response = self
            .client
            .get(format!("{}/v1/updates", self.base_url))
            .query(&[("offset", offset)])
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(TransportError::Unauthorized)
            }
            status if !status.is_success() => {
                let msg = response.text().await.unwrap_or_default();
                return Err(TransportError::Api(msg));
            }
            _ => {}
        }

        let updates: Vec<Update> = response.json().await?;
        debug!("Received {} updates", updates.len());
        Ok(updates)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, text, options))]
    async fn send(
        &self,
        peer: PeerId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            chat_id: peer,
            text: text.to_string(),
            parse_mode: options.parse_mode,
            reply_to: options.reply_to,
        };

        let response = self
            .client
            .post(format!("{}/v1/send", self.base_url))
            .bearer_auth(self.token.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(TransportError::SendFailed(msg));
        }

        debug!("Sent message to {}", peer);
        Ok(())
    }
}
