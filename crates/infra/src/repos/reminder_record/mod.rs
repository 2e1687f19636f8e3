mod inmemory;
mod postgres;

use clubnight_domain::{ReminderRecord, ID};
pub use inmemory::InMemoryReminderRecordRepo;
pub use postgres::PostgresReminderRecordRepo;

#[async_trait::async_trait]
pub trait IReminderRecordRepo: Send + Sync {
    /// Insert-if-absent. Returns true when this call created the record,
    /// false when a record for (event, user, type) already existed. Rows
    /// are written only after a confirmed send and never updated.
    async fn insert_if_absent(&self, record: &ReminderRecord) -> anyhow::Result<bool>;
    async fn exists(&self, event_id: &ID, user_id: &ID, reminder_type: &str) -> bool;
    /// Members already covered for (event, type); the dispatcher skips
    /// these up front.
    async fn find_sent_user_ids(&self, event_id: &ID, reminder_type: &str) -> Vec<ID>;
}
