//! Sends one message through the chat runtime, as the web widget would.

use std::sync::Arc;

use leadbot_agent::{AgentRuntime, ChatReply, EmailTemplates, MockEmailNotifier};
use leadbot_core::domain::session::SessionId;
use leadbot_db::{
    DbPool, EmailLogRepository, InMemoryEmailLogRepository, InMemoryLeadRepository,
    InMemorySessionRepository, LeadRepository, SessionRepository, SqlEmailLogRepository,
    SqlLeadRepository, SqlSessionRepository,
};

use crate::commands::{
    async_runtime, load_config, open_database, CommandResult, StepFailure, EXIT_DATABASE,
    EXIT_RUNTIME,
};

struct Stores {
    sessions: Arc<dyn SessionRepository>,
    leads: Arc<dyn LeadRepository>,
    email_logs: Arc<dyn EmailLogRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionRepository::default()),
            leads: Arc::new(InMemoryLeadRepository::default()),
            email_logs: Arc::new(InMemoryEmailLogRepository::default()),
        }
    }

    fn sql(pool: &DbPool) -> Self {
        Self {
            sessions: Arc::new(SqlSessionRepository::new(pool.clone())),
            leads: Arc::new(SqlLeadRepository::new(pool.clone())),
            email_logs: Arc::new(SqlEmailLogRepository::new(pool.clone())),
        }
    }
}

/// `dry_run` keeps everything in memory and leaves the database untouched.
pub fn run(session_id: &str, message: &str, dry_run: bool) -> CommandResult {
    if session_id.trim().is_empty() {
        return CommandResult::failure(
            "chat",
            "invalid_input",
            "session id must not be empty",
            EXIT_RUNTIME,
        );
    }

    let runtime = match async_runtime("chat") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = if dry_run {
        runtime.block_on(converse(Stores::in_memory(), session_id, message))
    } else {
        let config = match load_config("chat") {
            Ok(config) => config,
            Err(failure) => return failure,
        };
        runtime.block_on(async {
            let pool = open_database(&config).await?;
            let reply = converse(Stores::sql(&pool), session_id, message).await;
            pool.close().await;
            reply
        })
    };

    match result {
        Ok(reply) => CommandResult::success_with(
            "chat",
            reply.response.clone(),
            serde_json::to_value(&reply).ok(),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}

async fn converse(
    stores: Stores,
    session_id: &str,
    message: &str,
) -> Result<ChatReply, StepFailure> {
    let templates = EmailTemplates::new()
        .map_err(|error| ("templates", error.to_string(), EXIT_RUNTIME))?;
    let notifier = Arc::new(MockEmailNotifier::new(
        Arc::new(templates),
        stores.leads.clone(),
        stores.email_logs,
    ));
    let agent = AgentRuntime::new(stores.sessions, stores.leads, notifier);

    agent
        .handle_message("cli", &SessionId::from(session_id), message)
        .await
        .map_err(|error| ("chat_turn", error.to_string(), EXIT_DATABASE))
}
