//! Assemble the notification channels configured in the environment.

use std::sync::Arc;

use millguard_events::{
    EmailChannel, EmailConfig, NotificationChannel, SmsChannel, TwilioClient, TwilioConfig,
    VoiceChannel, WebhookChannel,
};

/// Build every channel whose settings are present, in dispatch order:
/// email, SMS, voice, webhook.
///
/// A channel that is configured but cannot be constructed is logged and
/// left out so the remaining channels still work.
pub fn channels_from_env() -> Vec<Arc<dyn NotificationChannel>> {
    let mut channels: Vec<Arc<dyn NotificationChannel>> = Vec::new();

    match EmailConfig::from_env().map(EmailChannel::new) {
        Some(Ok(email)) => channels.push(Arc::new(email)),
        Some(Err(e)) => tracing::error!(error = %e, "Email channel disabled"),
        None => tracing::info!("SMTP not configured, email channel disabled"),
    }

    match TwilioConfig::from_env().map(TwilioClient::new) {
        Some(Ok(client)) => {
            let client = Arc::new(client);
            channels.push(Arc::new(SmsChannel::new(Arc::clone(&client))));
            channels.push(Arc::new(VoiceChannel::new(client)));
        }
        Some(Err(e)) => tracing::error!(error = %e, "SMS and voice channels disabled"),
        None => tracing::info!("Twilio not configured, SMS and voice channels disabled"),
    }

    match WebhookChannel::from_env() {
        Some(Ok(webhook)) => channels.push(Arc::new(webhook)),
        Some(Err(e)) => tracing::error!(error = %e, "Webhook channel disabled"),
        None => {}
    }

    if channels.is_empty() {
        tracing::warn!("No notification channels configured; alerts will only be logged");
    }

    channels
}
