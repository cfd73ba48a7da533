use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lead::{Lead, LeadId, NotificationFlag};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Confirmation,
    Quote,
    ReviewRequest,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmation => "confirmation",
            Self::Quote => "quote",
            Self::ReviewRequest => "review_request",
        }
    }

    /// The lead flag raised once this kind of email has gone out.
    pub fn notification_flag(&self) -> NotificationFlag {
        match self {
            Self::Confirmation => NotificationFlag::EmailSent,
            Self::Quote => NotificationFlag::QuoteSent,
            Self::ReviewRequest => NotificationFlag::ReviewRequested,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "confirmation" => Some(Self::Confirmation),
            "quote" => Some(Self::Quote),
            "review_request" => Some(Self::ReviewRequest),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// A mocked outbound email. Nothing leaves the process; the log is the delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLog {
    pub id: String,
    pub lead_id: LeadId,
    pub email_type: EmailKind,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub status: String,
}

impl EmailLog {
    pub fn record(lead: &Lead, kind: EmailKind, content: EmailContent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            lead_id: lead.id.clone(),
            email_type: kind,
            recipient_name: lead.name.clone(),
            recipient_phone: lead.phone.clone(),
            subject: content.subject,
            body: content.body,
            sent_at: Utc::now(),
            status: "sent".to_string(),
        }
    }
}
