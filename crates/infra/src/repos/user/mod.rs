mod inmemory;
mod postgres;

use clubnight_domain::{NewUser, User, ID};
pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &NewUser) -> anyhow::Result<User>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    /// Lookup by canonical E.164 number; callers normalize first.
    async fn find_by_phone(&self, phone: &str) -> Option<User>;
    /// Lookup by email address, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Option<User>;
    /// Members a reminder may go to: active, opted in, not opted out, with
    /// a phone number on file.
    async fn find_reminder_eligible(&self) -> Vec<User>;
}
