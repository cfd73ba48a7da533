pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, LeadCaptureFlow};
pub use states::{
    ConversationState, FlowAction, FlowContext, FlowEvent, TransitionOutcome,
    UnknownConversationState,
};
