use super::IRateLimitRepo;
use sqlx::{FromRow, PgPool};

pub struct PostgresRateLimitRepo {
    pool: PgPool,
}

impl PostgresRateLimitRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CountRaw {
    count: i64,
}

#[async_trait::async_trait]
impl IRateLimitRepo for PostgresRateLimitRepo {
    async fn increment(
        &self,
        scope: &str,
        identifier: &str,
        window_start: i64,
        expires_at: i64,
    ) -> anyhow::Result<i64> {
        let raw: CountRaw = sqlx::query_as(
            r#"
            INSERT INTO rate_limit_counters
            (scope, identifier, window_start, count, expires_at)
            VALUES($1, $2, $3, 1, $4)
            ON CONFLICT (scope, identifier, window_start) DO UPDATE
            SET count = rate_limit_counters.count + 1
            RETURNING count
            "#,
        )
        .bind(scope)
        .bind(identifier)
        .bind(window_start)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.count)
    }

    async fn purge_expired(&self, now: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM rate_limit_counters
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
