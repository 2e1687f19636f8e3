mod inmemory;
mod postgres;

use chrono::NaiveDate;
use clubnight_domain::{Event, NewEvent, ID};
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn insert(&self, event: &NewEvent) -> anyhow::Result<Event>;
    async fn save(&self, event: &Event) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID) -> Option<Event>;
    /// All events still in `Upcoming` status. The sweep recomputes which of
    /// these are inside a reminder window every invocation.
    async fn find_upcoming(&self) -> Vec<Event>;
    /// The soonest upcoming event on or after the given civil date; the
    /// event a bare SMS yes/no is taken to answer.
    async fn find_next_upcoming(&self, on_or_after: NaiveDate) -> Option<Event>;
}
