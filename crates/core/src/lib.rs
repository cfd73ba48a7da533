pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use domain::email::{EmailContent, EmailKind, EmailLog};
pub use domain::intent::{Classification, Intent};
pub use domain::lead::{Lead, LeadId, LeadStats, LeadStatus, LeadSummary, NewLead, NotificationFlag};
pub use domain::session::{CollectedFields, LeadField, Session, SessionId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{
    ConversationState, FlowAction, FlowContext, FlowEngine, FlowEvent, LeadCaptureFlow,
    TransitionOutcome,
};
