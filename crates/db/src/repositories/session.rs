use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

use leadbot_core::domain::session::{CollectedFields, Session, SessionId};
use leadbot_core::flows::ConversationState;

use super::{format_timestamp, parse_timestamp, RepositoryError, SessionRepository};
use crate::DbPool;

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn find(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, state, collected_fields_json, updated_at
            FROM conversation_session
            WHERE session_id = ?
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn create(
        &self,
        session_id: &SessionId,
        initial: ConversationState,
    ) -> Result<Session, RepositoryError> {
        let now = format_timestamp(&Utc::now());
        sqlx::query(
            r#"
            INSERT INTO conversation_session (
                session_id, state, collected_fields_json, created_at, updated_at
            ) VALUES (?, ?, '{}', ?, ?)
            ON CONFLICT(session_id) DO NOTHING
            "#,
        )
        .bind(session_id.as_str())
        .bind(initial.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.find(session_id).await?.ok_or_else(|| {
            RepositoryError::Decode(format!(
                "session `{}` vanished after insert",
                session_id.as_str()
            ))
        })
    }

    async fn update(
        &self,
        session_id: &SessionId,
        state: ConversationState,
        fields: &CollectedFields,
    ) -> Result<(), RepositoryError> {
        let fields_json = fields
            .to_json()
            .map_err(|e| RepositoryError::Decode(format!("collected fields: {e}")))?;
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            r#"
            INSERT INTO conversation_session (
                session_id, state, collected_fields_json, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                state = excluded.state,
                collected_fields_json = excluded.collected_fields_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id.as_str())
        .bind(state.as_str())
        .bind(&fields_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn session_from_row(row: &SqliteRow) -> Result<Session, RepositoryError> {
    let session_id: String = row.try_get("session_id")?;
    let state: String = row.try_get("state")?;
    let fields_json: String = row.try_get("collected_fields_json")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Session {
        session_id: SessionId(session_id),
        state: state
            .parse::<ConversationState>()
            .map_err(|e| RepositoryError::Decode(e.to_string()))?,
        collected_fields: CollectedFields::from_json(&fields_json)
            .map_err(|e| RepositoryError::Decode(format!("invalid collected_fields_json: {e}")))?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use leadbot_core::domain::session::{CollectedFields, LeadField, SessionId};
    use leadbot_core::flows::ConversationState;

    use super::SqlSessionRepository;
    use crate::repositories::SessionRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn create_is_idempotent_and_starts_in_greeting() {
        let repo = SqlSessionRepository::new(setup_pool().await);
        let id = SessionId::from("web-abc");

        let first = repo.create(&id, ConversationState::Greeting).await.expect("create");
        assert_eq!(first.state, ConversationState::Greeting);
        assert!(first.collected_fields.is_empty());

        let mut fields = CollectedFields::default();
        fields.insert(LeadField::Name, "John Smith");
        repo.update(&id, ConversationState::CollectPhone, &fields).await.expect("update");

        let second = repo.create(&id, ConversationState::Greeting).await.expect("create again");
        assert_eq!(second.state, ConversationState::CollectPhone);
        assert_eq!(second.collected_fields.get(LeadField::Name), Some("John Smith"));
    }

    #[tokio::test]
    async fn update_replaces_state_and_fields_and_bumps_timestamp() {
        let repo = SqlSessionRepository::new(setup_pool().await);
        let id = SessionId::from("web-update");
        let created = repo.create(&id, ConversationState::Greeting).await.expect("create");

        let mut fields = CollectedFields::default();
        fields.insert(LeadField::Name, "Jane");
        fields.insert(LeadField::Phone, "0412345678");
        repo.update(&id, ConversationState::CollectSuburb, &fields).await.expect("update");

        let stored = repo.find(&id).await.expect("find").expect("session exists");
        assert_eq!(stored.state, ConversationState::CollectSuburb);
        assert_eq!(stored.collected_fields, fields);
        assert!(stored.updated_at >= created.updated_at);

        repo.update(&id, ConversationState::Completed, &CollectedFields::default())
            .await
            .expect("complete");
        let completed = repo.find(&id).await.expect("find").expect("session exists");
        assert!(completed.collected_fields.is_empty());
    }

    #[tokio::test]
    async fn create_stores_the_initial_state_it_is_given() {
        let repo = SqlSessionRepository::new(setup_pool().await);
        let id = SessionId::from("web-initial");

        let created = repo.create(&id, ConversationState::Faq).await.expect("create");
        assert_eq!(created.state, ConversationState::Faq);

        let stored = repo.find(&id).await.expect("find").expect("session exists");
        assert_eq!(stored.state, ConversationState::Faq);
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let repo = SqlSessionRepository::new(setup_pool().await);
        assert!(repo.find(&SessionId::from("nobody")).await.expect("find").is_none());
    }
}
