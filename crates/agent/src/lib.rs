//! Conversation runtime for the lead-qualification chatbot.
//!
//! Each inbound message runs through a fixed pipeline:
//! 1. **Classification** (`classifier`, `faq`) - priority-ordered keyword rules tag the
//!    utterance and pick a canned answer.
//! 2. **Validation** (`validators`) - while a lead field is being collected, the utterance
//!    is screened as a name, phone number or free text.
//! 3. **Transition** - the pure flow engine in `leadbot-core` decides the next state and
//!    the side effects to run.
//! 4. **Effects** (`runtime`, `notifications`) - session and lead writes, then the
//!    simulated confirmation email.
//!
//! Nothing here guesses: every response comes from a fixed table, and the same input in
//! the same state always produces the same reply.

pub mod classifier;
pub mod faq;
pub mod leads;
pub mod notifications;
pub mod replies;
pub mod runtime;
pub mod validators;

pub use classifier::IntentClassifier;
pub use leads::LeadDesk;
pub use notifications::{EmailPreview, EmailTemplates, LeadNotifier, MockEmailNotifier, NotificationError};
pub use runtime::{AgentError, AgentRuntime, ChatReply};
