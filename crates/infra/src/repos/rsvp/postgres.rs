use super::{IRsvpRepo, RsvpWriteResult};
use clubnight_domain::{Rsvp, RsvpUpdate, ID};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresRsvpRepo {
    pool: PgPool,
}

impl PostgresRsvpRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RsvpRaw {
    event_id: i64,
    user_id: i64,
    status: String,
    comments: Option<String>,
    admin_override: bool,
    overridden_by: Option<i64>,
    overridden_at: Option<i64>,
    updated_via_calendar: bool,
}

#[derive(Debug, FromRow)]
struct RsvpUpsertRaw {
    event_id: i64,
    user_id: i64,
    status: String,
    comments: Option<String>,
    admin_override: bool,
    overridden_by: Option<i64>,
    overridden_at: Option<i64>,
    updated_via_calendar: bool,
    inserted: bool,
}

impl RsvpRaw {
    fn into_domain(self) -> anyhow::Result<Rsvp> {
        Ok(Rsvp {
            event_id: self.event_id.into(),
            user_id: self.user_id.into(),
            status: self.status.parse()?,
            comments: self.comments,
            admin_override: self.admin_override,
            overridden_by: self.overridden_by.map(Into::into),
            overridden_at: self.overridden_at,
            updated_via_calendar: self.updated_via_calendar,
        })
    }
}

impl RsvpUpsertRaw {
    fn into_domain(self) -> anyhow::Result<(Rsvp, bool)> {
        let inserted = self.inserted;
        let raw = RsvpRaw {
            event_id: self.event_id,
            user_id: self.user_id,
            status: self.status,
            comments: self.comments,
            admin_override: self.admin_override,
            overridden_by: self.overridden_by,
            overridden_at: self.overridden_at,
            updated_via_calendar: self.updated_via_calendar,
        };
        Ok((raw.into_domain()?, inserted))
    }
}

#[async_trait::async_trait]
impl IRsvpRepo for PostgresRsvpRepo {
    async fn upsert(&self, update: &RsvpUpdate) -> anyhow::Result<RsvpWriteResult> {
        // xmax = 0 distinguishes a fresh insert from a conflict-update.
        let raw: RsvpUpsertRaw = sqlx::query_as(
            r#"
            INSERT INTO rsvps
            (event_id, user_id, status, comments, admin_override, overridden_by, overridden_at, updated_via_calendar)
            VALUES($1, $2, $3, $4, FALSE, NULL, NULL, $5)
            ON CONFLICT (event_id, user_id) DO UPDATE
            SET status = EXCLUDED.status,
            comments = COALESCE(EXCLUDED.comments, rsvps.comments),
            admin_override = FALSE,
            overridden_by = NULL,
            overridden_at = NULL,
            updated_via_calendar = EXCLUDED.updated_via_calendar
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(update.event_id.inner())
        .bind(update.user_id.inner())
        .bind(update.status.as_str())
        .bind(&update.comments)
        .bind(update.via_calendar)
        .fetch_one(&self.pool)
        .await?;

        let (rsvp, inserted) = raw.into_domain()?;
        Ok(if inserted {
            RsvpWriteResult::Created(rsvp)
        } else {
            RsvpWriteResult::Updated(rsvp)
        })
    }

    async fn save(&self, rsvp: &Rsvp) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO rsvps
            (event_id, user_id, status, comments, admin_override, overridden_by, overridden_at, updated_via_calendar)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (event_id, user_id) DO UPDATE
            SET status = EXCLUDED.status,
            comments = EXCLUDED.comments,
            admin_override = EXCLUDED.admin_override,
            overridden_by = EXCLUDED.overridden_by,
            overridden_at = EXCLUDED.overridden_at,
            updated_via_calendar = EXCLUDED.updated_via_calendar
            "#,
        )
        .bind(rsvp.event_id.inner())
        .bind(rsvp.user_id.inner())
        .bind(rsvp.status.as_str())
        .bind(&rsvp.comments)
        .bind(rsvp.admin_override)
        .bind(rsvp.overridden_by.map(|id| id.inner()))
        .bind(rsvp.overridden_at)
        .bind(rsvp.updated_via_calendar)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, event_id: &ID, user_id: &ID) -> Option<Rsvp> {
        let raw: RsvpRaw = sqlx::query_as(
            r#"
            SELECT * FROM rsvps
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id.inner())
        .bind(user_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn find_by_event(&self, event_id: &ID) -> Vec<Rsvp> {
        let rows: Vec<RsvpRaw> = sqlx::query_as(
            r#"
            SELECT * FROM rsvps
            WHERE event_id = $1
            "#,
        )
        .bind(event_id.inner())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch rsvps for event {}: {:?}", event_id, e);
            vec![]
        });
        rows.into_iter()
            .filter_map(|raw| raw.into_domain().ok())
            .collect()
    }
}
