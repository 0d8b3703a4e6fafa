//! Notification requests produced by the decision core and the maintenance
//! scheduler, plus the operator-facing message templates.

use serde::Serialize;

use crate::fault::FaultClass;
use crate::types::Timestamp;

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    /// A fault class was detected and its cooldown had elapsed.
    FaultAlert { fault_class: FaultClass },
    /// Preventive maintenance is overdue.
    MaintenanceDue,
}

impl NotificationKind {
    /// Dot-separated event name used in logs and webhook payloads.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FaultAlert { .. } => "fault.alert",
            Self::MaintenanceDue => "maintenance.due",
        }
    }
}

/// Per-channel renderings of one notification.
///
/// A channel whose variant is `None` is skipped for this request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageVariants {
    pub email_subject: String,
    pub email_body: String,
    pub sms_body: Option<String>,
    pub voice_script: Option<String>,
}

/// One notification to fan out across every configured channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub messages: MessageVariants,
    pub created_at: Timestamp,
}

impl NotificationRequest {
    /// Alert for a detected fault class.
    pub fn fault_alert(fault_class: FaultClass, now: Timestamp) -> Self {
        let text = format!("Machine fault detected! Fault class: {}", fault_class.name);
        Self {
            messages: MessageVariants {
                email_subject: "Machine Fault Alert".to_string(),
                email_body: text.clone(),
                sms_body: Some(text),
                voice_script: Some("Machine fault detected! Immediate attention required.".to_string()),
            },
            kind: NotificationKind::FaultAlert { fault_class },
            created_at: now,
        }
    }

    /// Reminder that preventive maintenance is overdue. No voice call.
    pub fn maintenance_due(now: Timestamp) -> Self {
        Self {
            kind: NotificationKind::MaintenanceDue,
            messages: MessageVariants {
                email_subject: "Maintenance Due Alert".to_string(),
                email_body: "Reminder: Machine maintenance is overdue. Please perform maintenance."
                    .to_string(),
                sms_body: Some(
                    "Reminder: Machine maintenance is overdue. Please service the machine."
                        .to_string(),
                ),
                voice_script: None,
            },
            created_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
