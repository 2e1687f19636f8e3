use super::{IPollRepo, PollCloseOutcome};
use chrono::{NaiveDate, NaiveTime};
use clubnight_domain::{Event, NewEvent, Poll, PollDateOption, Restaurant, ID};
use sqlx::{FromRow, PgPool};

pub struct PostgresPollRepo {
    pool: PgPool,
}

impl PostgresPollRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PollRaw {
    poll_id: i64,
    status: String,
    winning_restaurant_id: Option<i64>,
    winning_date_option_id: Option<i64>,
    created_event_id: Option<i64>,
}

impl PollRaw {
    fn into_domain(self) -> anyhow::Result<Poll> {
        Ok(Poll {
            id: self.poll_id.into(),
            status: self.status.parse()?,
            winning_restaurant_id: self.winning_restaurant_id.map(Into::into),
            winning_date_option_id: self.winning_date_option_id.map(Into::into),
            created_event_id: self.created_event_id.map(Into::into),
        })
    }
}

#[derive(Debug, FromRow)]
struct RestaurantRaw {
    restaurant_id: i64,
    name: String,
    address: Option<String>,
}

impl RestaurantRaw {
    fn into_domain(self) -> Restaurant {
        Restaurant {
            id: self.restaurant_id.into(),
            name: self.name,
            address: self.address,
        }
    }
}

#[derive(Debug, FromRow)]
struct DateOptionRaw {
    date_option_id: i64,
    poll_id: i64,
    date: NaiveDate,
}

impl DateOptionRaw {
    fn into_domain(self) -> PollDateOption {
        PollDateOption {
            id: self.date_option_id.into(),
            poll_id: self.poll_id.into(),
            date: self.date,
        }
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

#[derive(Debug, FromRow)]
struct CountRaw {
    count: i64,
}

#[async_trait::async_trait]
impl IPollRepo for PostgresPollRepo {
    async fn insert(&self) -> anyhow::Result<Poll> {
        let raw: PollRaw = sqlx::query_as(
            r#"
            INSERT INTO polls (status)
            VALUES('active')
            RETURNING *
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        raw.into_domain()
    }

    async fn find(&self, poll_id: &ID) -> Option<Poll> {
        let raw: PollRaw = sqlx::query_as(
            r#"
            SELECT * FROM polls
            WHERE poll_id = $1
            "#,
        )
        .bind(poll_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        raw.into_domain().ok()
    }

    async fn insert_restaurant(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> anyhow::Result<Restaurant> {
        let raw: RestaurantRaw = sqlx::query_as(
            r#"
            INSERT INTO restaurants (name, address)
            VALUES($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(address)
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.into_domain())
    }

    async fn find_restaurant(&self, restaurant_id: &ID) -> Option<Restaurant> {
        let raw: RestaurantRaw = sqlx::query_as(
            r#"
            SELECT * FROM restaurants
            WHERE restaurant_id = $1
            "#,
        )
        .bind(restaurant_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        Some(raw.into_domain())
    }

    async fn insert_date_option(
        &self,
        poll_id: &ID,
        date: NaiveDate,
    ) -> anyhow::Result<PollDateOption> {
        let raw: DateOptionRaw = sqlx::query_as(
            r#"
            INSERT INTO poll_date_options (poll_id, date)
            VALUES($1, $2)
            RETURNING *
            "#,
        )
        .bind(poll_id.inner())
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.into_domain())
    }

    async fn find_date_option(&self, option_id: &ID) -> Option<PollDateOption> {
        let raw: DateOptionRaw = sqlx::query_as(
            r#"
            SELECT * FROM poll_date_options
            WHERE date_option_id = $1
            "#,
        )
        .bind(option_id.inner())
        .fetch_one(&self.pool)
        .await
        .ok()?;
        Some(raw.into_domain())
    }

    async fn add_restaurant_vote(
        &self,
        poll_id: &ID,
        restaurant_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO poll_restaurant_votes (poll_id, restaurant_id, user_id)
            VALUES($1, $2, $3)
            ON CONFLICT (poll_id, user_id) DO UPDATE
            SET restaurant_id = EXCLUDED.restaurant_id
            "#,
        )
        .bind(poll_id.inner())
        .bind(restaurant_id.inner())
        .bind(user_id.inner())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_date_vote(
        &self,
        poll_id: &ID,
        option_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO poll_date_votes (poll_id, date_option_id, user_id)
            VALUES($1, $2, $3)
            ON CONFLICT (poll_id, user_id) DO UPDATE
            SET date_option_id = EXCLUDED.date_option_id
            "#,
        )
        .bind(poll_id.inner())
        .bind(option_id.inner())
        .bind(user_id.inner())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn restaurant_vote_count(
        &self,
        poll_id: &ID,
        restaurant_id: &ID,
    ) -> anyhow::Result<i64> {
        let raw: CountRaw = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count FROM poll_restaurant_votes
            WHERE poll_id = $1 AND restaurant_id = $2
            "#,
        )
        .bind(poll_id.inner())
        .bind(restaurant_id.inner())
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.count)
    }

    async fn date_vote_count(&self, poll_id: &ID, option_id: &ID) -> anyhow::Result<i64> {
        let raw: CountRaw = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count FROM poll_date_votes
            WHERE poll_id = $1 AND date_option_id = $2
            "#,
        )
        .bind(poll_id.inner())
        .bind(option_id.inner())
        .fetch_one(&self.pool)
        .await?;
        Ok(raw.count)
    }

    async fn close_with_event(
        &self,
        poll_id: &ID,
        winning_restaurant_id: &ID,
        winning_date_option_id: &ID,
        event: &NewEvent,
    ) -> anyhow::Result<PollCloseOutcome> {
        let mut tx = self.pool.begin().await?;

        let closed = sqlx::query(
            r#"
            UPDATE polls
            SET status = 'closed',
            winning_restaurant_id = $2,
            winning_date_option_id = $3
            WHERE poll_id = $1 AND status = 'active'
            "#,
        )
        .bind(poll_id.inner())
        .bind(winning_restaurant_id.inner())
        .bind(winning_date_option_id.inner())
        .execute(&mut tx)
        .await?;

        if closed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(PollCloseOutcome::AlreadyClosed);
        }

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
        .fetch_one(&mut tx)
        .await?;
        let created = raw.into_domain()?;

        sqlx::query(
            r#"
            UPDATE polls
            SET created_event_id = $2
            WHERE poll_id = $1
            "#,
        )
        .bind(poll_id.inner())
        .bind(created.id.inner())
        .execute(&mut tx)
        .await?;

        tx.commit().await?;
        Ok(PollCloseOutcome::Closed(created))
    }
}
