//! Well-known notification channel name constants.
//!
//! These are the names reported in a dispatch report and used in log fields.
//! The channel set is open: any other name is accepted by the dispatcher.

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// SMS text message delivered via the Twilio messaging API.
pub const CHANNEL_SMS: &str = "sms";

/// Voice call placed via the Twilio voice API.
pub const CHANNEL_VOICE: &str = "voice";

/// JSON payload POSTed to an external HTTP endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";
