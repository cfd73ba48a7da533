use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use leadbot_core::domain::lead::{Lead, LeadId, LeadStats, LeadStatus, NotificationFlag};

use super::{format_timestamp, parse_timestamp, LeadRepository, RepositoryError, MAX_LEAD_PAGE};
use crate::DbPool;

const LEAD_COLUMNS: &str = "id, name, phone, suburb, job_description, status, created_at, \
                            email_sent, quote_sent, review_requested, sms_sent";

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepository for SqlLeadRepository {
    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO lead (
                id, name, phone, suburb, job_description, status, created_at,
                email_sent, quote_sent, review_requested, sms_sent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lead.id.0)
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.suburb)
        .bind(&lead.job_description)
        .bind(lead.status.as_str())
        .bind(format_timestamp(&lead.created_at))
        .bind(lead.email_sent)
        .bind(lead.quote_sent)
        .bind(lead.review_requested)
        .bind(lead.sms_sent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {LEAD_COLUMNS} FROM lead WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(lead_from_row).transpose()
    }

    async fn list(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAD_COLUMNS} FROM lead ORDER BY created_at DESC, rowid DESC LIMIT ?"
        ))
        .bind(i64::from(limit.min(MAX_LEAD_PAGE)))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(lead_from_row).collect()
    }

    async fn update_status(&self, id: &LeadId, status: LeadStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE lead SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_notification(
        &self,
        id: &LeadId,
        flag: NotificationFlag,
    ) -> Result<bool, RepositoryError> {
        // Column names come from a closed enum, never from input.
        let result = sqlx::query(&format!("UPDATE lead SET {} = 1 WHERE id = ?", flag.column()))
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &LeadId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM lead WHERE id = ?").bind(&id.0).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> Result<LeadStats, RepositoryError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM lead GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut stats = LeadStats::default();
        for row in &rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            let status = status
                .parse::<LeadStatus>()
                .map_err(|e| RepositoryError::Decode(e.to_string()))?;
            stats.record(status, count.max(0) as u64);
        }

        Ok(stats)
    }
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead, RepositoryError> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Lead {
        id: LeadId(id),
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        suburb: row.try_get("suburb")?,
        job_description: row.try_get("job_description")?,
        status: status.parse::<LeadStatus>().map_err(|e| RepositoryError::Decode(e.to_string()))?,
        created_at: parse_timestamp("created_at", &created_at)?,
        email_sent: row.try_get("email_sent")?,
        quote_sent: row.try_get("quote_sent")?,
        review_requested: row.try_get("review_requested")?,
        sms_sent: row.try_get("sms_sent")?,
    })
}
