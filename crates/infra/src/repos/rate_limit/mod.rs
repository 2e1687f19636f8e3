mod inmemory;
mod postgres;

pub use inmemory::InMemoryRateLimitRepo;
pub use postgres::PostgresRateLimitRepo;

/// Fixed-window counters keyed by (scope, identifier, window start).
#[async_trait::async_trait]
pub trait IRateLimitRepo: Send + Sync {
    /// Bumps the counter for the window and returns the new count. The
    /// first call in a window creates the row.
    async fn increment(
        &self,
        scope: &str,
        identifier: &str,
        window_start: i64,
        expires_at: i64,
    ) -> anyhow::Result<i64>;
    /// Lazy cleanup of windows past their expiry.
    async fn purge_expired(&self, now: i64) -> anyhow::Result<u64>;
}
