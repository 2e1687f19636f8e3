use super::IReminderRecordRepo;
use clubnight_domain::{ReminderRecord, ID};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresReminderRecordRepo {
    pool: PgPool,
}

impl PostgresReminderRecordRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SentUserIdRaw {
    user_id: i64,
}

#[async_trait::async_trait]
impl IReminderRecordRepo for PostgresReminderRecordRepo {
    async fn insert_if_absent(&self, record: &ReminderRecord) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO reminder_records
            (event_id, user_id, reminder_type)
            VALUES($1, $2, $3)
            ON CONFLICT (event_id, user_id, reminder_type) DO NOTHING
            "#,
        )
        .bind(record.event_id.inner())
        .bind(record.user_id.inner())
        .bind(&record.reminder_type)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn exists(&self, event_id: &ID, user_id: &ID, reminder_type: &str) -> bool {
        sqlx::query(
            r#"
            SELECT 1 AS one FROM reminder_records
            WHERE event_id = $1 AND user_id = $2 AND reminder_type = $3
            "#,
        )
        .bind(event_id.inner())
        .bind(user_id.inner())
        .bind(reminder_type)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .is_some()
    }

    async fn find_sent_user_ids(&self, event_id: &ID, reminder_type: &str) -> Vec<ID> {
        let rows: Vec<SentUserIdRaw> = sqlx::query_as(
            r#"
            SELECT user_id FROM reminder_records
            WHERE event_id = $1 AND reminder_type = $2
            "#,
        )
        .bind(event_id.inner())
        .bind(reminder_type)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to fetch reminder records for event {}: {:?}",
                event_id, e
            );
            vec![]
        });
        rows.into_iter().map(|raw| raw.user_id.into()).collect()
    }
}
