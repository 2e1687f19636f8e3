mod event;
mod poll;
mod rate_limit;
mod reminder_record;
mod rsvp;
mod shared;
mod user;

use event::{InMemoryEventRepo, PostgresEventRepo};
use poll::{InMemoryPollRepo, PostgresPollRepo};
use rate_limit::{InMemoryRateLimitRepo, PostgresRateLimitRepo};
use reminder_record::{InMemoryReminderRecordRepo, PostgresReminderRecordRepo};
use rsvp::{InMemoryRsvpRepo, PostgresRsvpRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use user::{InMemoryUserRepo, PostgresUserRepo};

pub use event::IEventRepo;
pub use poll::{IPollRepo, PollCloseOutcome};
pub use rate_limit::IRateLimitRepo;
pub use reminder_record::IReminderRecordRepo;
pub use rsvp::{IRsvpRepo, RsvpWriteResult};
pub use user::IUserRepo;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub rsvps: Arc<dyn IRsvpRepo>,
    pub reminder_records: Arc<dyn IReminderRecordRepo>,
    pub polls: Arc<dyn IPollRepo>,
    pub rate_limits: Arc<dyn IRateLimitRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await?;

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            rsvps: Arc::new(PostgresRsvpRepo::new(pool.clone())),
            reminder_records: Arc::new(PostgresReminderRecordRepo::new(pool.clone())),
            polls: Arc::new(PostgresPollRepo::new(pool.clone())),
            rate_limits: Arc::new(PostgresRateLimitRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        let events: Arc<dyn IEventRepo> = Arc::new(InMemoryEventRepo::new());
        Self {
            events: events.clone(),
            users: Arc::new(InMemoryUserRepo::new()),
            rsvps: Arc::new(InMemoryRsvpRepo::new()),
            reminder_records: Arc::new(InMemoryReminderRecordRepo::new()),
            polls: Arc::new(InMemoryPollRepo::new(events)),
            rate_limits: Arc::new(InMemoryRateLimitRepo::new()),
        }
    }
}
