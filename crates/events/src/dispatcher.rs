//! Concurrent, failure-isolated fan-out of one notification.
//!
//! Every channel runs in its own task under a per-channel timeout. A channel
//! that errors, panics or hangs is recorded in the [`DispatchReport`] and
//! never affects the other channels or the caller: [`Dispatcher::dispatch`]
//! itself cannot fail.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use millguard_core::notification::NotificationRequest;
use serde::Serialize;

use crate::delivery::email::EmailError;
use crate::delivery::twilio::TwilioError;
use crate::delivery::webhook::WebhookError;

/// Default upper bound on a single channel's delivery attempt.
pub const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Channel port
// ---------------------------------------------------------------------------

/// Result of a channel handling one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The transport accepted the message.
    Sent,
    /// The request carries no message for this channel.
    NotApplicable,
}

/// Error type for a single channel's delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Twilio(#[from] TwilioError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Any other transport failure (custom channels).
    #[error("{0}")]
    Other(String),
}

/// One outbound transport (email, SMS, voice call, ...).
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    /// Stable channel name used in reports and logs.
    fn name(&self) -> &str;

    /// Attempt delivery of the channel's message variant of `request`.
    async fn send(&self, request: &NotificationRequest) -> Result<Delivery, ChannelError>;
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-channel result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Delivered,
    Skipped,
    Failed { error: String },
    TimedOut,
}

impl ChannelOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::TimedOut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub channel: String,
    pub outcome: ChannelOutcome,
}

/// Outcome of one dispatch, in configured channel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub event_type: &'static str,
    pub channels: Vec<ChannelReport>,
}

impl DispatchReport {
    /// Outcome for a channel by name.
    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.channels
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| &r.outcome)
    }

    pub fn delivered_count(&self) -> usize {
        self.channels.iter().filter(|r| r.outcome.is_delivered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.channels.iter().filter(|r| r.outcome.is_failure()).count()
    }

    /// `true` when at least one channel was attempted and none delivered.
    pub fn all_failed(&self) -> bool {
        self.failed_count() > 0 && self.delivered_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Fans notifications out to an ordered list of channels.
///
/// Cheap to clone; channels are shared behind `Arc`.
#[derive(Clone)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    channel_timeout: Duration,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, channel_timeout: Duration) -> Self {
        Self {
            channels,
            channel_timeout,
        }
    }

    /// Names of the configured channels, in order.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    /// Deliver `request` on every channel concurrently and wait for all of
    /// them (each bounded by the channel timeout).
    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchReport {
        let request = Arc::new(request.clone());
        let timeout = self.channel_timeout;

        let tasks = self.channels.iter().map(|channel| {
            let channel = Arc::clone(channel);
            let request = Arc::clone(&request);
            tokio::spawn(async move {
                match tokio::time::timeout(timeout, channel.send(&request)).await {
                    Ok(Ok(Delivery::Sent)) => ChannelOutcome::Delivered,
                    Ok(Ok(Delivery::NotApplicable)) => ChannelOutcome::Skipped,
                    Ok(Err(e)) => ChannelOutcome::Failed {
                        error: e.to_string(),
                    },
                    Err(_) => ChannelOutcome::TimedOut,
                }
            })
        });

        let results = futures::future::join_all(tasks).await;

        let channels: Vec<ChannelReport> = self
            .channels
            .iter()
            .zip(results)
            .map(|(channel, joined)| {
                let outcome = joined.unwrap_or_else(|e| ChannelOutcome::Failed {
                    error: format!("channel task aborted: {e}"),
                });
                log_outcome(channel.name(), request.kind.event_type(), &outcome, timeout);
                ChannelReport {
                    channel: channel.name().to_string(),
                    outcome,
                }
            })
            .collect();

        let report = DispatchReport {
            event_type: request.kind.event_type(),
            channels,
        };

        tracing::info!(
            event_type = report.event_type,
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "Notification dispatched"
        );

        report
    }
}

fn log_outcome(channel: &str, event_type: &str, outcome: &ChannelOutcome, timeout: Duration) {
    match outcome {
        ChannelOutcome::Delivered => {
            tracing::debug!(channel, event_type, "Channel delivered notification");
        }
        ChannelOutcome::Skipped => {
            tracing::debug!(channel, event_type, "Channel has no message for this notification");
        }
        ChannelOutcome::Failed { error } => {
            tracing::warn!(channel, event_type, error = %error, "Channel delivery failed");
        }
        ChannelOutcome::TimedOut => {
            tracing::warn!(
                channel,
                event_type,
                timeout_secs = timeout.as_secs(),
                "Channel delivery timed out"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
