pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_from_config, connect_with_settings, DbPool};
pub use repositories::{
    EmailLogRepository, InMemoryEmailLogRepository, InMemoryLeadRepository,
    InMemorySessionRepository, LeadRepository, RepositoryError, SessionRepository,
    SqlEmailLogRepository, SqlLeadRepository, SqlSessionRepository,
};
