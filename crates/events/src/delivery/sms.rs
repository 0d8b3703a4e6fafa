//! SMS channel backed by the Twilio messaging API.

use std::sync::Arc;

use async_trait::async_trait;
use millguard_core::channels::CHANNEL_SMS;
use millguard_core::notification::NotificationRequest;

use crate::delivery::twilio::TwilioClient;
use crate::dispatcher::{ChannelError, Delivery, NotificationChannel};

pub struct SmsChannel {
    client: Arc<TwilioClient>,
}

impl SmsChannel {
    pub fn new(client: Arc<TwilioClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn name(&self) -> &str {
        CHANNEL_SMS
    }

    async fn send(&self, request: &NotificationRequest) -> Result<Delivery, ChannelError> {
        let Some(body) = request.messages.sms_body.as_deref() else {
            return Ok(Delivery::NotApplicable);
        };
        self.client.send_sms(body).await?;
        tracing::info!(event_type = request.kind.event_type(), "Alert SMS sent");
        Ok(Delivery::Sent)
    }
}
