use thiserror::Error;

use crate::domain::intent::Intent;
use crate::domain::session::LeadField;
use crate::flows::states::{
    ConversationState, FlowAction, FlowContext, FlowEvent, TransitionOutcome,
};

pub trait FlowDefinition {
    fn initial_state(&self) -> ConversationState;
    fn transition(
        &self,
        current: &ConversationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Greeting/FAQ chatter that funnels into name, phone, suburb and job collection.
#[derive(Clone, Debug, Default)]
pub struct LeadCaptureFlow;

impl FlowDefinition for LeadCaptureFlow {
    fn initial_state(&self) -> ConversationState {
        ConversationState::Greeting
    }

    fn transition(
        &self,
        current: &ConversationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_lead_capture(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> ConversationState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &ConversationState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }
}

impl Default for FlowEngine<LeadCaptureFlow> {
    fn default() -> Self {
        Self::new(LeadCaptureFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("cannot capture lead from {state:?}, missing fields: {missing_fields:?}")]
    MissingLeadFields { state: ConversationState, missing_fields: Vec<LeadField> },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: ConversationState, event: FlowEvent },
}

fn transition_lead_capture(
    current: &ConversationState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use ConversationState::{
        CollectJob, CollectName, CollectPhone, CollectSuburb, Completed, Faq, Greeting,
    };
    use FlowAction::{
        CaptureLead, ClearCollectedFields, NotifyLeadCaptured, PersistSession, StoreField,
    };
    use FlowEvent::{FieldAccepted, FieldRejected, IntentDetected, QuestionInterrupted};

    let invalid = || FlowTransitionError::InvalidTransition { state: *current, event: *event };

    let (to, actions) = match (current, event) {
        (CollectName, FieldAccepted(LeadField::Name)) => {
            (CollectPhone, vec![StoreField(LeadField::Name), PersistSession])
        }
        (CollectPhone, FieldAccepted(LeadField::Phone)) => {
            (CollectSuburb, vec![StoreField(LeadField::Phone), PersistSession])
        }
        (CollectSuburb, FieldAccepted(LeadField::Suburb)) => {
            (CollectJob, vec![StoreField(LeadField::Suburb), PersistSession])
        }
        (CollectJob, FieldAccepted(LeadField::JobDescription)) => {
            let missing = context
                .missing_lead_fields
                .iter()
                .copied()
                .filter(|field| *field != LeadField::JobDescription)
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                return Err(FlowTransitionError::MissingLeadFields {
                    state: *current,
                    missing_fields: missing,
                });
            }
            (
                Completed,
                vec![
                    StoreField(LeadField::JobDescription),
                    CaptureLead,
                    NotifyLeadCaptured,
                    ClearCollectedFields,
                    PersistSession,
                ],
            )
        }
        (state, FieldRejected(field)) if state.collecting_field() == Some(*field) => {
            (*state, Vec::new())
        }
        (state, QuestionInterrupted) if state.is_collecting() => (*state, Vec::new()),
        (state, IntentDetected(intent)) if !state.is_collecting() => match intent {
            Intent::StartLead | Intent::Affirmative => {
                (CollectName, vec![ClearCollectedFields, PersistSession])
            }
            Intent::Greeting => (Greeting, vec![ClearCollectedFields, PersistSession]),
            Intent::Faq | Intent::DiyWarning => (Faq, vec![PersistSession]),
            Intent::Negative | Intent::ExploreServices | Intent::Unknown => (*state, Vec::new()),
        },
        _ => return Err(invalid()),
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}
