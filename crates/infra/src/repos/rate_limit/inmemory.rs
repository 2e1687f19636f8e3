use super::IRateLimitRepo;
use clubnight_domain::RateLimitCounter;
use std::sync::Mutex;

pub struct InMemoryRateLimitRepo {
    counters: Mutex<Vec<RateLimitCounter>>,
}

impl InMemoryRateLimitRepo {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IRateLimitRepo for InMemoryRateLimitRepo {
    async fn increment(
        &self,
        scope: &str,
        identifier: &str,
        window_start: i64,
        expires_at: i64,
    ) -> anyhow::Result<i64> {
        let mut counters = self.counters.lock().unwrap();
        if let Some(counter) = counters.iter_mut().find(|c| {
            c.scope == scope && c.identifier == identifier && c.window_start == window_start
        }) {
            counter.count += 1;
            return Ok(counter.count);
        }
        counters.push(RateLimitCounter {
            scope: scope.to_string(),
            identifier: identifier.to_string(),
            window_start,
            count: 1,
            expires_at,
        });
        Ok(1)
    }

    async fn purge_expired(&self, now: i64) -> anyhow::Result<u64> {
        let mut counters = self.counters.lock().unwrap();
        let before = counters.len();
        counters.retain(|c| c.expires_at > now);
        Ok((before - counters.len()) as u64)
    }
}
