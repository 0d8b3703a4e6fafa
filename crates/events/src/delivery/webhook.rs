//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookChannel`] POSTs a JSON rendering of each [`NotificationRequest`]
//! to an external URL (chat integrations, pager bridges). Failed attempts are
//! retried with exponential backoff (1 s, 2 s, 4 s); the dispatcher's
//! per-channel timeout still bounds the whole sequence.

use std::time::Duration;

use async_trait::async_trait;
use millguard_core::channels::CHANNEL_WEBHOOK;
use millguard_core::notification::NotificationRequest;

use crate::dispatcher::{ChannelError, Delivery, NotificationChannel};

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookChannel
// ---------------------------------------------------------------------------

/// Delivers notifications to one external webhook endpoint.
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Build from `ALERT_WEBHOOK_URL`, or `None` when unset.
    pub fn from_env() -> Option<Result<Self, WebhookError>> {
        std::env::var("ALERT_WEBHOOK_URL").ok().map(Self::new)
    }

    /// Deliver a payload with retry. Returns `Ok(())` on the first success.
    async fn deliver(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let mut last_err: Option<WebhookError> = None;

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %self.url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        // Final attempt after the last backoff.
        match self.try_send(payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "Webhook delivery failed after all retries");
                Err(last_err.unwrap_or(e))
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        CHANNEL_WEBHOOK
    }

    async fn send(&self, request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        self.deliver(&webhook_payload(request)).await?;
        Ok(Delivery::Sent)
    }
}

/// JSON body POSTed for a request.
pub fn webhook_payload(request: &NotificationRequest) -> serde_json::Value {
    serde_json::json!({
        "event_type": request.kind.event_type(),
        "kind": request.kind,
        "subject": request.messages.email_subject,
        "text": request.messages.email_body,
        "timestamp": request.created_at,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
