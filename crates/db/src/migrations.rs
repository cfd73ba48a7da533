use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

pub async fn table_exists(pool: &DbPool, table: &str) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, table_exists};
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "conversation_session",
        "lead",
        "email_log",
        "idx_lead_created_at",
        "idx_lead_status",
        "idx_email_log_lead_id",
        "idx_email_log_sent_at",
    ];

    async fn schema_object_count(pool: &crate::DbPool, name: &str) -> i64 {
        sqlx::query("SELECT COUNT(*) AS count FROM sqlite_master WHERE name = ?")
            .bind(name)
            .fetch_one(pool)
            .await
            .expect("query sqlite_master")
            .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_every_managed_object() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for name in MANAGED_SCHEMA_OBJECTS {
            assert_eq!(schema_object_count(&pool, name).await, 1, "missing schema object {name}");
        }
    }

    #[tokio::test]
    async fn table_check_tracks_migration_state() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        assert!(!table_exists(&pool, "lead").await.expect("check before"));

        run_pending(&pool).await.expect("run migrations");
        assert!(table_exists(&pool, "lead").await.expect("check after"));
        assert!(!table_exists(&pool, "idx_lead_status").await.expect("indexes are not tables"));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let applied = sqlx::query("SELECT COUNT(*) AS count FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("count applied migrations")
            .get::<i64, _>("count");
        assert_eq!(applied as usize, MIGRATOR.iter().count());
    }

    #[tokio::test]
    async fn lead_status_is_constrained_by_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let result = sqlx::query(
            "INSERT INTO lead (id, name, phone, suburb, job_description, status, created_at)
             VALUES ('L-1', 'Jo', '0412345678', 'Berwick', 'Lights', 'archived', '2025-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err(), "unknown status should violate the CHECK constraint");
    }
}
