use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::intent::Intent;
use crate::domain::session::LeadField;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Greeting,
    Faq,
    CollectName,
    CollectPhone,
    CollectSuburb,
    CollectJob,
    Completed,
}

impl ConversationState {
    pub const ALL: [ConversationState; 7] = [
        Self::Greeting,
        Self::Faq,
        Self::CollectName,
        Self::CollectPhone,
        Self::CollectSuburb,
        Self::CollectJob,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Faq => "faq",
            Self::CollectName => "collect_name",
            Self::CollectPhone => "collect_phone",
            Self::CollectSuburb => "collect_suburb",
            Self::CollectJob => "collect_job",
            Self::Completed => "completed",
        }
    }

    /// The lead field this state is waiting for, if it is one of the collection states.
    pub fn collecting_field(&self) -> Option<LeadField> {
        match self {
            Self::CollectName => Some(LeadField::Name),
            Self::CollectPhone => Some(LeadField::Phone),
            Self::CollectSuburb => Some(LeadField::Suburb),
            Self::CollectJob => Some(LeadField::JobDescription),
            Self::Greeting | Self::Faq | Self::Completed => None,
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting_field().is_some()
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownConversationState(pub String);

impl fmt::Display for UnknownConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown conversation state `{}`", self.0)
    }
}

impl std::error::Error for UnknownConversationState {}

impl FromStr for ConversationState {
    type Err = UnknownConversationState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| UnknownConversationState(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    /// The utterance passed the validator for the field being collected.
    FieldAccepted(LeadField),
    FieldRejected(LeadField),
    /// A question arrived mid-collection and was answered in place.
    QuestionInterrupted,
    IntentDetected(Intent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub missing_lead_fields: Vec<LeadField>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    StoreField(LeadField),
    ClearCollectedFields,
    CaptureLead,
    NotifyLeadCaptured,
    PersistSession,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: ConversationState,
    pub to: ConversationState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}

#[cfg(test)]
mod tests {
    use super::ConversationState;
    use crate::domain::session::LeadField;

    #[test]
    fn states_round_trip_through_their_storage_names() {
        for state in ConversationState::ALL {
            let parsed: ConversationState = state.as_str().parse().expect("known state");
            assert_eq!(parsed, state);
        }
        assert!("diy_warning".parse::<ConversationState>().is_err());
    }

    #[test]
    fn only_collection_states_wait_for_a_field() {
        assert_eq!(ConversationState::CollectPhone.collecting_field(), Some(LeadField::Phone));
        assert_eq!(
            ConversationState::CollectJob.collecting_field(),
            Some(LeadField::JobDescription)
        );
        assert!(!ConversationState::Completed.is_collecting());
        assert!(!ConversationState::Greeting.is_collecting());
    }
}
