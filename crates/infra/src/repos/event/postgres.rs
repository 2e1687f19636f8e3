use super::IEventRepo;
use chrono::{NaiveDate, NaiveTime};
use clubnight_domain::{Event, NewEvent, ID};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_id: i64,
    restaurant_name: String,
    restaurant_address: Option<String>,
    event_date: NaiveDate,
    event_time: NaiveTime,
    status: String,
}

impl EventRaw {
    fn into_domain(self) -> anyhow::Result<Event> {
        Ok(Event {
            id: self.event_id.into(),
            restaurant_name: self.restaurant_name,
            restaurant_address: self.restaurant_address,
            event_date: self.event_date,
            event_time: self.event_time,
            status: self.status.parse()?,
        })
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, event: &NewEvent) -> anyhow::Result<Event> {
        let raw: EventRaw = sqlx::query_as(
            r#"
            INSERT INTO events
            (restaurant_name, restaurant_address, event_date, event_time, status)
            VALUES($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&event.restaurant_name)
        .bind(&event.restaurant_address)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(event.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        raw.into_domain()
    }

    async fn save(&self, event: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE events
            SET restaurant_name = $2,
            restaurant_address = $3,
            event_date = $4,
            event_time = $5,
            status = $6
            WHERE event_id = $1
            "#,
        )
        .bind(event.id.inner())
        .bind(&event.restaurant_name)
        .bind(&event.restaurant_address)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(event.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        let raw: EventRaw = sqlx::query_as(
            r#"
            SELECT * FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn find_upcoming(&self) -> Vec<Event> {
        let rows: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events
            WHERE status = 'upcoming'
            ORDER BY event_date, event_time
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch upcoming events: {:?}", e);
            vec![]
        });
        rows.into_iter()
            .filter_map(|raw| raw.into_domain().ok())
            .collect()
    }

    async fn find_next_upcoming(&self, on_or_after: NaiveDate) -> Option<Event> {
        let raw: EventRaw = sqlx::query_as(
            r#"
            SELECT * FROM events
            WHERE status = 'upcoming' AND event_date >= $1
            ORDER BY event_date, event_time
            LIMIT 1
            "#,
        )
        .bind(on_or_after)
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }
}
