//! Millguard notification dispatch.
//!
//! - [`Dispatcher`] fans one [`NotificationRequest`] out to every configured
//!   channel concurrently, bounding each channel with a timeout and
//!   isolating failures into a [`DispatchReport`].
//! - [`NotificationChannel`] is the extension point for transports.
//! - [`delivery`] holds the shipped transports (email, SMS, voice, webhook).
//!
//! [`NotificationRequest`]: millguard_core::notification::NotificationRequest

pub mod delivery;
pub mod dispatcher;

pub use delivery::email::{EmailChannel, EmailConfig};
pub use delivery::sms::SmsChannel;
pub use delivery::twilio::{TwilioClient, TwilioConfig};
pub use delivery::voice::VoiceChannel;
pub use delivery::webhook::WebhookChannel;
pub use dispatcher::{
    ChannelError, ChannelOutcome, ChannelReport, Delivery, DispatchReport, Dispatcher,
    NotificationChannel,
};
