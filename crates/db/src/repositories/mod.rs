use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use leadbot_core::domain::email::EmailLog;
use leadbot_core::domain::lead::{Lead, LeadId, LeadStats, LeadStatus, NotificationFlag};
use leadbot_core::domain::session::{CollectedFields, Session, SessionId};
use leadbot_core::errors::ApplicationError;
use leadbot_core::flows::ConversationState;

pub mod email_log;
pub mod lead;
pub mod memory;
pub mod session;

pub use email_log::SqlEmailLogRepository;
pub use lead::SqlLeadRepository;
pub use memory::{InMemoryEmailLogRepository, InMemoryLeadRepository, InMemorySessionRepository};
pub use session::SqlSessionRepository;

pub const MAX_LEAD_PAGE: u32 = 1000;
pub const MAX_EMAIL_LOG_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Durable per-conversation state keyed by the client's session id.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Returns the existing session when one is already stored for `session_id`.
    async fn create(
        &self,
        session_id: &SessionId,
        initial: ConversationState,
    ) -> Result<Session, RepositoryError>;

    async fn update(
        &self,
        session_id: &SessionId,
        state: ConversationState,
        fields: &CollectedFields,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    /// Newest first, capped at [`MAX_LEAD_PAGE`].
    async fn list(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError>;
    async fn update_status(&self, id: &LeadId, status: LeadStatus) -> Result<bool, RepositoryError>;
    async fn mark_notification(
        &self,
        id: &LeadId,
        flag: NotificationFlag,
    ) -> Result<bool, RepositoryError>;
    async fn delete(&self, id: &LeadId) -> Result<bool, RepositoryError>;
    async fn count_by_status(&self) -> Result<LeadStats, RepositoryError>;
}

#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    async fn insert(&self, log: &EmailLog) -> Result<(), RepositoryError>;
    /// Newest first, capped at [`MAX_EMAIL_LOG_PAGE`].
    async fn list(
        &self,
        lead_id: Option<&LeadId>,
        limit: u32,
    ) -> Result<Vec<EmailLog>, RepositoryError>;
}

pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp in `{column}`: {e}")))
}
