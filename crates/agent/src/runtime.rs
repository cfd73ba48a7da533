use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use leadbot_core::domain::intent::{Classification, Intent};
use leadbot_core::domain::lead::{Lead, LeadSummary};
use leadbot_core::domain::session::{LeadField, Session, SessionId};
use leadbot_core::errors::{ApplicationError, DomainError};
use leadbot_core::flows::{
    ConversationState, FlowAction, FlowContext, FlowEngine, FlowEvent, LeadCaptureFlow,
    TransitionOutcome,
};
use leadbot_db::repositories::{LeadRepository, RepositoryError, SessionRepository};

use crate::classifier::{looks_like_question, mentions_pricing, IntentClassifier};
use crate::notifications::LeadNotifier;
use crate::replies::{self, QuickReplyContext};
use crate::validators::{is_present, is_valid_name, is_valid_phone};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub action: Option<String>,
    pub lead_data: Option<LeadSummary>,
    pub quick_replies: Option<Vec<String>>,
}

impl ChatReply {
    fn new(response: String, action: Option<&str>, quick_replies: QuickReplyContext) -> Self {
        Self {
            response,
            action: action.map(str::to_string),
            lead_data: None,
            quick_replies: Some(replies::quick_replies(quick_replies)),
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::Repository(error) => error.into(),
            AgentError::Domain(error) => error.into(),
        }
    }
}

/// Drives one chat turn at a time per session: classify, validate, transition, persist.
pub struct AgentRuntime {
    classifier: IntentClassifier,
    flow: FlowEngine<LeadCaptureFlow>,
    sessions: Arc<dyn SessionRepository>,
    leads: Arc<dyn LeadRepository>,
    notifier: Arc<dyn LeadNotifier>,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AgentRuntime {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        leads: Arc<dyn LeadRepository>,
        notifier: Arc<dyn LeadNotifier>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            flow: FlowEngine::default(),
            sessions,
            leads,
            notifier,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle_message(
        &self,
        correlation_id: &str,
        session_id: &SessionId,
        message: &str,
    ) -> Result<ChatReply, AgentError> {
        let lock = self.session_lock(session_id).await;
        let result = {
            let _turn = lock.lock().await;
            self.run_turn(correlation_id, session_id, message).await
        };
        self.release_session_lock(session_id, lock).await;
        result
    }

    async fn run_turn(
        &self,
        correlation_id: &str,
        session_id: &SessionId,
        message: &str,
    ) -> Result<ChatReply, AgentError> {
        let text = message.trim();
        let session = self.load_or_create(session_id).await?;
        let classification = self.classifier.classify(text);
        let event = derive_event(session.state, &classification, text);
        let (event, outcome) = self.transition(correlation_id, &session, event);

        let mut fields = session.collected_fields.clone();
        let mut captured: Option<Lead> = None;
        for action in &outcome.actions {
            match action {
                FlowAction::StoreField(field) => fields.insert(*field, text),
                FlowAction::CaptureLead => {
                    let lead = Lead::capture(&fields)?;
                    self.leads.insert(&lead).await?;
                    info!(
                        event_name = "lead.captured",
                        correlation_id = %correlation_id,
                        session_id = %session_id.as_str(),
                        lead_id = %lead.id,
                        "lead captured from chat"
                    );
                    captured = Some(lead);
                }
                FlowAction::NotifyLeadCaptured => {
                    if let Some(lead) = captured.as_mut() {
                        self.notify(correlation_id, lead).await;
                    }
                }
                FlowAction::ClearCollectedFields => fields.clear(),
                FlowAction::PersistSession => {
                    self.sessions.update(session_id, outcome.to, &fields).await?;
                }
            }
        }

        info!(
            event_name = "chat.turn.completed",
            correlation_id = %correlation_id,
            session_id = %session_id.as_str(),
            intent = classification.intent.as_str(),
            from_state = outcome.from.as_str(),
            to_state = outcome.to.as_str(),
            "chat turn completed"
        );

        Ok(compose_reply(outcome.from, &event, &classification, text, captured.as_ref()))
    }

    async fn load_or_create(&self, session_id: &SessionId) -> Result<Session, AgentError> {
        match self.sessions.find(session_id).await? {
            Some(session) => Ok(session),
            None => Ok(self.sessions.create(session_id, self.flow.initial_state()).await?),
        }
    }

    /// A session that cannot complete (fields lost from storage) restarts collection
    /// rather than failing the turn.
    fn transition(
        &self,
        correlation_id: &str,
        session: &Session,
        event: FlowEvent,
    ) -> (FlowEvent, TransitionOutcome) {
        let context = FlowContext { missing_lead_fields: session.collected_fields.missing() };
        match self.flow.apply(&session.state, &event, &context) {
            Ok(outcome) => (event, outcome),
            Err(error) => {
                warn!(
                    event_name = "chat.turn.restarted",
                    correlation_id = %correlation_id,
                    session_id = %session.session_id.as_str(),
                    error = %error,
                    "session could not advance; restarting lead collection"
                );
                let restart = FlowEvent::IntentDetected(Intent::StartLead);
                let outcome = TransitionOutcome {
                    from: session.state,
                    to: ConversationState::CollectName,
                    event: restart,
                    actions: vec![FlowAction::ClearCollectedFields, FlowAction::PersistSession],
                };
                (restart, outcome)
            }
        }
    }

    async fn notify(&self, correlation_id: &str, lead: &mut Lead) {
        match self.notifier.on_lead_captured(lead).await {
            Ok(_) => lead.email_sent = true,
            Err(error) => warn!(
                event_name = "notification.email.failed",
                correlation_id = %correlation_id,
                lead_id = %lead.id,
                error = %error,
                "confirmation email could not be recorded"
            ),
        }
    }

    async fn session_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(session_id.as_str().to_string()).or_default().clone()
    }

    async fn release_session_lock(&self, session_id: &SessionId, lock: Arc<Mutex<()>>) {
        let mut locks = self.session_locks.lock().await;
        // Only the registry and this turn hold it: nobody is queued behind us.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(session_id.as_str());
        }
    }
}

/// Maps an utterance onto the flow event for the current state. In a collecting state a
/// question the bot can answer pre-empts field validation.
fn derive_event(state: ConversationState, classification: &Classification, text: &str) -> FlowEvent {
    let Some(field) = state.collecting_field() else {
        return FlowEvent::IntentDetected(classification.intent);
    };

    if looks_like_question(text)
        && (classification.intent.answers_question() || mentions_pricing(text))
    {
        return FlowEvent::QuestionInterrupted;
    }

    let accepted = match field {
        LeadField::Name => is_valid_name(text),
        LeadField::Phone => is_valid_phone(text),
        LeadField::Suburb | LeadField::JobDescription => is_present(text),
    };
    if accepted {
        FlowEvent::FieldAccepted(field)
    } else {
        FlowEvent::FieldRejected(field)
    }
}

fn compose_reply(
    from: ConversationState,
    event: &FlowEvent,
    classification: &Classification,
    text: &str,
    captured: Option<&Lead>,
) -> ChatReply {
    use QuickReplyContext as Chips;

    match (event, captured) {
        (FlowEvent::QuestionInterrupted, _) => {
            let field = from.collecting_field().unwrap_or(LeadField::Name);
            let response = if classification.intent.answers_question() {
                replies::answer_then_remind(classification.response_or_empty(), field)
            } else {
                replies::pricing_reminder(field)
            };
            ChatReply::new(response, None, Chips::QuestionInterrupt)
        }
        (FlowEvent::FieldAccepted(LeadField::JobDescription), Some(lead)) => ChatReply {
            response: replies::lead_saved(lead),
            action: Some("lead_saved".to_string()),
            lead_data: Some(lead.summary()),
            quick_replies: Some(replies::quick_replies(Chips::LeadSaved)),
        },
        (FlowEvent::FieldAccepted(LeadField::Name), _) => {
            ChatReply::new(replies::ask_phone(text), Some("collect_phone"), Chips::CollectPhone)
        }
        (FlowEvent::FieldAccepted(LeadField::Phone), _) => {
            ChatReply::new(replies::ask_suburb(), Some("collect_suburb"), Chips::CollectSuburb)
        }
        (FlowEvent::FieldAccepted(_), _) => {
            ChatReply::new(replies::ask_job(), Some("collect_job"), Chips::CollectJob)
        }
        (FlowEvent::FieldRejected(LeadField::Name), _) => {
            ChatReply::new(replies::invalid_name(), Some("collect_name"), Chips::CollectName)
        }
        (FlowEvent::FieldRejected(LeadField::Phone), _) => {
            ChatReply::new(replies::invalid_phone(), Some("collect_phone"), Chips::CollectPhone)
        }
        (FlowEvent::FieldRejected(LeadField::Suburb), _) => {
            ChatReply::new(replies::missing_suburb(), Some("collect_suburb"), Chips::CollectSuburb)
        }
        (FlowEvent::FieldRejected(LeadField::JobDescription), _) => {
            ChatReply::new(replies::missing_job(), Some("collect_job"), Chips::CollectJob)
        }
        (FlowEvent::IntentDetected(intent), _) => {
            let canned = classification.response_or_empty().to_string();
            match intent {
                Intent::StartLead | Intent::Affirmative => ChatReply::new(
                    replies::collection_start(),
                    Some("collect_name"),
                    Chips::CollectName,
                ),
                Intent::Greeting => ChatReply::new(canned, None, Chips::Greeting),
                Intent::DiyWarning => ChatReply::new(canned, None, Chips::DiyWarning),
                Intent::Faq => ChatReply::new(canned, None, Chips::FaqFollowup),
                Intent::Negative => ChatReply::new(canned, None, Chips::Negative),
                Intent::ExploreServices | Intent::Unknown => {
                    ChatReply::new(canned, None, Chips::Greeting)
                }
            }
        }
    }
}
