//! Minimal Twilio REST client shared by the SMS and voice channels.
//!
//! Only the two endpoints the monitor needs are wrapped: create message and
//! create call. Both are form-encoded POSTs authenticated with the account
//! SID and auth token.

use std::time::Duration;

/// HTTP request timeout for a single Twilio API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API base URL; overridable for tests and regional edges.
const DEFAULT_API_BASE: &str = "https://api.twilio.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Twilio API failures.
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("Twilio request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Twilio answered with a non-2xx status.
    #[error("Twilio API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

// ---------------------------------------------------------------------------
// TwilioConfig
// ---------------------------------------------------------------------------

/// Credentials and phone numbers for Twilio delivery.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Twilio-provisioned sender number.
    pub from_phone: String,
    /// Operator phone number that receives SMS and calls.
    pub to_phone: String,
    pub api_base: String,
}

impl TwilioConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless all of `TWILIO_SID`, `TWILIO_TOKEN`,
    /// `TWILIO_PHONE` and `USER_PHONE` are set. `TWILIO_API_BASE` is optional.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            account_sid: std::env::var("TWILIO_SID").ok()?,
            auth_token: std::env::var("TWILIO_TOKEN").ok()?,
            from_phone: std::env::var("TWILIO_PHONE").ok()?,
            to_phone: std::env::var("USER_PHONE").ok()?,
            api_base: std::env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// TwilioClient
// ---------------------------------------------------------------------------

pub struct TwilioClient {
    config: TwilioConfig,
    http: reqwest::Client,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, http })
    }

    /// Send an SMS to the operator.
    pub async fn send_sms(&self, body: &str) -> Result<(), TwilioError> {
        let form = [
            ("To", self.config.to_phone.as_str()),
            ("From", self.config.from_phone.as_str()),
            ("Body", body),
        ];
        self.post("Messages.json", &form).await
    }

    /// Place a voice call to the operator that plays the given TwiML.
    pub async fn place_call(&self, twiml: &str) -> Result<(), TwilioError> {
        let form = [
            ("To", self.config.to_phone.as_str()),
            ("From", self.config.from_phone.as_str()),
            ("Twiml", twiml),
        ];
        self.post("Calls.json", &form).await
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/{resource}",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    async fn post(&self, resource: &str, form: &[(&str, &str)]) -> Result<(), TwilioError> {
        let response = self
            .http
            .post(self.endpoint(resource))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
