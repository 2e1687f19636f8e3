/// Fixed-window counter row. The key is (scope, identifier, window_start);
/// a counter is bumped in place within its window and lazily purged after
/// `expires_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitCounter {
    pub scope: String,
    pub identifier: String,
    pub window_start: i64,
    pub count: i64,
    pub expires_at: i64,
}

/// Start of the fixed window containing `now_millis`.
pub fn window_start(now_millis: i64, window_millis: i64) -> i64 {
    now_millis - now_millis.rem_euclid(window_millis)
}
