use super::IUserRepo;
use clubnight_domain::{NewUser, User, ID};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_id: i64,
    name: String,
    email: String,
    phone: Option<String>,
    sms_opt_in: bool,
    sms_opted_out_at: Option<i64>,
    status: String,
}

impl UserRaw {
    fn into_domain(self) -> anyhow::Result<User> {
        Ok(User {
            id: self.user_id.into(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            sms_opt_in: self.sms_opt_in,
            sms_opted_out_at: self.sms_opted_out_at,
            status: self.status.parse()?,
        })
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &NewUser) -> anyhow::Result<User> {
        let raw: UserRaw = sqlx::query_as(
            r#"
            INSERT INTO users
            (name, email, phone, sms_opt_in, sms_opted_out_at, status)
            VALUES($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.sms_opt_in)
        .bind(user.sms_opted_out_at)
        .bind(user.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        raw.into_domain()
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
            email = $3,
            phone = $4,
            sms_opt_in = $5,
            sms_opted_out_at = $6,
            status = $7
            WHERE user_id = $1
            "#,
        )
        .bind(user.id.inner())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.sms_opt_in)
        .bind(user.sms_opted_out_at)
        .bind(user.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        let raw: UserRaw = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn find_by_phone(&self, phone: &str) -> Option<User> {
        let raw: UserRaw = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        let raw: UserRaw = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn find_reminder_eligible(&self) -> Vec<User> {
        let rows: Vec<UserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE status = 'active'
            AND sms_opt_in = TRUE
            AND sms_opted_out_at IS NULL
            AND phone IS NOT NULL
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch reminder eligible users: {:?}", e);
            vec![]
        });
        rows.into_iter()
            .filter_map(|raw| raw.into_domain().ok())
            .collect()
    }
}
