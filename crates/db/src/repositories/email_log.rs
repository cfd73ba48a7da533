use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use leadbot_core::domain::email::{EmailKind, EmailLog};
use leadbot_core::domain::lead::LeadId;

use super::{
    format_timestamp, parse_timestamp, EmailLogRepository, RepositoryError, MAX_EMAIL_LOG_PAGE,
};
use crate::DbPool;

pub struct SqlEmailLogRepository {
    pool: DbPool,
}

impl SqlEmailLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailLogRepository for SqlEmailLogRepository {
    async fn insert(&self, log: &EmailLog) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO email_log (
                id, lead_id, email_type, recipient_name, recipient_phone,
                subject, body, sent_at, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.lead_id.0)
        .bind(log.email_type.as_str())
        .bind(&log.recipient_name)
        .bind(&log.recipient_phone)
        .bind(&log.subject)
        .bind(&log.body)
        .bind(format_timestamp(&log.sent_at))
        .bind(&log.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(
        &self,
        lead_id: Option<&LeadId>,
        limit: u32,
    ) -> Result<Vec<EmailLog>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, lead_id, email_type, recipient_name, recipient_phone,
                   subject, body, sent_at, status
            FROM email_log
            WHERE (?1 IS NULL OR lead_id = ?1)
            ORDER BY sent_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(lead_id.map(|id| id.0.as_str()))
        .bind(i64::from(limit.min(MAX_EMAIL_LOG_PAGE)))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(email_log_from_row).collect()
    }
}

fn email_log_from_row(row: &SqliteRow) -> Result<EmailLog, RepositoryError> {
    let lead_id: String = row.try_get("lead_id")?;
    let email_type: String = row.try_get("email_type")?;
    let sent_at: String = row.try_get("sent_at")?;

    Ok(EmailLog {
        id: row.try_get("id")?,
        lead_id: LeadId(lead_id),
        email_type: EmailKind::parse(&email_type)
            .ok_or_else(|| RepositoryError::Decode(format!("invalid email_type: {email_type}")))?,
        recipient_name: row.try_get("recipient_name")?,
        recipient_phone: row.try_get("recipient_phone")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        sent_at: parse_timestamp("sent_at", &sent_at)?,
        status: row.try_get("status")?,
    })
}
