use std::sync::Arc;

use leadbot_agent::{AgentRuntime, EmailTemplates, LeadDesk, MockEmailNotifier, NotificationError};
use leadbot_core::config::{AppConfig, ConfigError, LoadOptions};
use leadbot_db::{
    connect_from_config, migrations, DbPool, EmailLogRepository, LeadRepository,
    SessionRepository, SqlEmailLogRepository, SqlLeadRepository, SqlSessionRepository,
};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AgentRuntime>,
    pub desk: Arc<LeadDesk>,
}

impl Application {
    pub fn api_state(&self) -> ApiState {
        ApiState::new(self.runtime.clone(), self.desk.clone())
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("email templates failed to load: {0}")]
    Templates(#[source] NotificationError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let templates = Arc::new(EmailTemplates::new().map_err(BootstrapError::Templates)?);
    let sessions: Arc<dyn SessionRepository> =
        Arc::new(SqlSessionRepository::new(db_pool.clone()));
    let leads: Arc<dyn LeadRepository> = Arc::new(SqlLeadRepository::new(db_pool.clone()));
    let email_logs: Arc<dyn EmailLogRepository> =
        Arc::new(SqlEmailLogRepository::new(db_pool.clone()));

    let notifier = Arc::new(MockEmailNotifier::new(templates, leads.clone(), email_logs.clone()));
    let runtime = Arc::new(AgentRuntime::new(sessions, leads.clone(), notifier.clone()));
    let desk = Arc::new(LeadDesk::new(leads, email_logs, notifier));

    Ok(Application { config, db_pool, runtime, desk })
}

#[cfg(test)]
mod tests {
    use leadbot_core::config::{ConfigOverrides, LoadOptions};
    use leadbot_core::domain::session::SessionId;

    use crate::bootstrap::bootstrap;

    fn options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn rejects_non_sqlite_database_urls() {
        let result = bootstrap(options("postgres://localhost/leads")).await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("database.url"));
    }

    #[tokio::test]
    async fn wires_stores_and_runtime_against_one_database() {
        let app = bootstrap(options("sqlite::memory:")).await.expect("bootstrap should succeed");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('conversation_session', 'lead', 'email_log')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("tables should exist after bootstrap");
        assert_eq!(table_count, 3);

        let reply = app
            .runtime
            .handle_message("bootstrap-test", &SessionId::from("boot"), "hello")
            .await
            .expect("chat turn");
        assert!(reply.response.contains("Add Power Electrics"));

        let stats = app.desk.stats().await.expect("stats");
        assert_eq!(stats.total_leads, 0);

        app.db_pool.close().await;
    }
}
