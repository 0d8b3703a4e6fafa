//! Shipped notification transports.
//!
//! Each submodule provides a [`NotificationChannel`](crate::NotificationChannel)
//! implementation plus its own error type. Configuration is read from the
//! environment; a transport whose variables are missing is simply not built.

pub mod email;
pub mod sms;
pub mod twilio;
pub mod voice;
pub mod webhook;
