use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::session::{CollectedFields, LeadField};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Booked,
    Completed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [Self::New, Self::Contacted, Self::Booked, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Booked => "booked",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| DomainError::InvalidLeadStatus(value.to_string()))
    }
}

/// Side-effect flags flipped by the mocked notification triggers. Never reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationFlag {
    EmailSent,
    QuoteSent,
    ReviewRequested,
    SmsSent,
}

impl NotificationFlag {
    pub fn column(&self) -> &'static str {
        match self {
            Self::EmailSent => "email_sent",
            Self::QuoteSent => "quote_sent",
            Self::ReviewRequested => "review_requested",
            Self::SmsSent => "sms_sent",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub suburb: String,
    pub job_description: String,
}

impl NewLead {
    pub fn from_collected(fields: &CollectedFields) -> Result<Self, DomainError> {
        let missing = fields.missing();
        if !missing.is_empty() {
            return Err(DomainError::IncompleteLead { missing });
        }

        let value = |field| fields.get(field).unwrap_or_default().to_string();
        Ok(Self {
            name: value(LeadField::Name),
            phone: value(LeadField::Phone),
            suburb: value(LeadField::Suburb),
            job_description: value(LeadField::JobDescription),
        })
    }

    /// Manual entry path: every field must carry something other than whitespace.
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing = [
            (LeadField::Name, &self.name),
            (LeadField::Phone, &self.phone),
            (LeadField::Suburb, &self.suburb),
            (LeadField::JobDescription, &self.job_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::IncompleteLead { missing })
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
    pub suburb: String,
    pub job_description: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub email_sent: bool,
    pub quote_sent: bool,
    pub review_requested: bool,
    pub sms_sent: bool,
}

impl Lead {
    pub fn new(draft: NewLead) -> Self {
        Self {
            id: LeadId::generate(),
            name: draft.name,
            phone: draft.phone,
            suburb: draft.suburb,
            job_description: draft.job_description,
            status: LeadStatus::New,
            created_at: Utc::now(),
            email_sent: false,
            quote_sent: false,
            review_requested: false,
            sms_sent: false,
        }
    }

    pub fn capture(fields: &CollectedFields) -> Result<Self, DomainError> {
        NewLead::from_collected(fields).map(Self::new)
    }

    pub fn flag(&self, flag: NotificationFlag) -> bool {
        match flag {
            NotificationFlag::EmailSent => self.email_sent,
            NotificationFlag::QuoteSent => self.quote_sent,
            NotificationFlag::ReviewRequested => self.review_requested,
            NotificationFlag::SmsSent => self.sms_sent,
        }
    }

    pub fn raise_flag(&mut self, flag: NotificationFlag) {
        match flag {
            NotificationFlag::EmailSent => self.email_sent = true,
            NotificationFlag::QuoteSent => self.quote_sent = true,
            NotificationFlag::ReviewRequested => self.review_requested = true,
            NotificationFlag::SmsSent => self.sms_sent = true,
        }
    }

    pub fn summary(&self) -> LeadSummary {
        LeadSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            suburb: self.suburb.clone(),
            job_description: self.job_description.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// The lead as echoed back to the chat client once captured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSummary {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
    pub suburb: String,
    pub job_description: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadStats {
    pub total_leads: u64,
    pub new_leads: u64,
    pub contacted: u64,
    pub booked: u64,
    pub completed: u64,
}

impl LeadStats {
    pub fn record(&mut self, status: LeadStatus, count: u64) {
        self.total_leads += count;
        match status {
            LeadStatus::New => self.new_leads += count,
            LeadStatus::Contacted => self.contacted += count,
            LeadStatus::Booked => self.booked += count,
            LeadStatus::Completed => self.completed += count,
        }
    }
}
