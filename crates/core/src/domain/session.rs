use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flows::states::ConversationState;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Name,
    Phone,
    Suburb,
    JobDescription,
}

impl LeadField {
    pub const ALL: [LeadField; 4] =
        [Self::Name, Self::Phone, Self::Suburb, Self::JobDescription];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Suburb => "suburb",
            Self::JobDescription => "job_description",
        }
    }

    /// How the field is named when asking the customer for it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone number",
            Self::Suburb => "suburb",
            Self::JobDescription => "job description",
        }
    }
}

/// Field values accepted so far in the current collection run, keyed by field key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedFields(BTreeMap<String, String>);

impl CollectedFields {
    pub fn get(&self, field: LeadField) -> Option<&str> {
        self.0.get(field.key()).map(String::as_str)
    }

    pub fn insert(&mut self, field: LeadField, value: impl Into<String>) {
        self.0.insert(field.key().to_string(), value.into());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn missing(&self) -> Vec<LeadField> {
        LeadField::ALL.into_iter().filter(|field| self.get(*field).is_none()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub state: ConversationState,
    pub collected_fields: CollectedFields,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(session_id: SessionId, state: ConversationState) -> Self {
        Self {
            session_id,
            state,
            collected_fields: CollectedFields::default(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectedFields, LeadField, Session, SessionId};
    use crate::flows::states::ConversationState;

    #[test]
    fn new_sessions_start_with_no_fields() {
        let session = Session::new(SessionId::from("web-1"), ConversationState::Greeting);
        assert_eq!(session.state, ConversationState::Greeting);
        assert!(session.collected_fields.is_empty());
    }

    #[test]
    fn collected_fields_report_what_is_still_missing() {
        let mut fields = CollectedFields::default();
        fields.insert(LeadField::Name, "John Smith");
        fields.insert(LeadField::Suburb, "Berwick");

        assert_eq!(fields.missing(), vec![LeadField::Phone, LeadField::JobDescription]);

        let json = fields.to_json().expect("serialize fields");
        assert_eq!(json, r#"{"name":"John Smith","suburb":"Berwick"}"#);
        assert_eq!(CollectedFields::from_json(&json).expect("parse fields"), fields);

        fields.clear();
        assert_eq!(fields.missing().len(), 4);
    }
}
