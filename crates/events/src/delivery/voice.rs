//! Voice-call channel backed by the Twilio voice API.
//!
//! The request's voice script is spoken with a TwiML `<Say>` verb.

use std::sync::Arc;

use async_trait::async_trait;
use millguard_core::channels::CHANNEL_VOICE;
use millguard_core::notification::NotificationRequest;

use crate::delivery::twilio::TwilioClient;
use crate::dispatcher::{ChannelError, Delivery, NotificationChannel};

pub struct VoiceChannel {
    client: Arc<TwilioClient>,
}

impl VoiceChannel {
    pub fn new(client: Arc<TwilioClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationChannel for VoiceChannel {
    fn name(&self) -> &str {
        CHANNEL_VOICE
    }

    async fn send(&self, request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        let Some(script) = request.messages.voice_script.as_deref() else {
            return Ok(Delivery::NotApplicable);
        };
        self.client.place_call(&say_twiml(script)).await?;
        tracing::info!(event_type = request.kind.event_type(), "Alert call placed");
        Ok(Delivery::Sent)
    }
}

/// Wrap a script in a TwiML response that reads it aloud.
pub fn say_twiml(script: &str) -> String {
    format!("<Response><Say>{}</Say></Response>", xml_escape(script))
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
