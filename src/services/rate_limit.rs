use std::time::Duration;
use thiserror::Error;

use crate::services::cache::{CacheKey, SharedConnection};

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),
}

/// Outcome of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until a retry would be admitted
    pub retry_after_secs: u64,
}

/// Sliding-window rate limiter backed by a Redis sorted set
///
/// Each admitted request is a member scored by its timestamp; members older
/// than the window are trimmed before counting. Denied requests are removed
/// again so retries are not held back by earlier rejections.
pub struct RateLimiter {
    redis: SharedConnection,
    scope: String,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(redis: SharedConnection, scope: &str, max_requests: u32, window: Duration) -> Self {
        Self {
            redis,
            scope: scope.to_string(),
            max_requests,
            window,
        }
    }

    /// Record a request from `identifier` and decide whether to let it through
    pub async fn check(&self, identifier: &str) -> Result<RateLimitDecision, RateLimitError> {
        let key = CacheKey::rate_limit(&self.scope, identifier);
        let window_ms = self.window.as_millis().min(i64::MAX as u128) as i64;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let member = format!("{}-{}", now_ms, uuid::Uuid::new_v4());

        let mut conn = self.redis.lock().await;
        let (entries,): (Vec<(String, f64)>,) = redis::pipe()
            .atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(&key)
            .arg("-inf")
            .arg(now_ms - window_ms)
            .ignore()
            .cmd("ZADD")
            .arg(&key)
            .arg(now_ms)
            .arg(&member)
            .ignore()
            .cmd("ZRANGE")
            .arg(&key)
            .arg(0)
            .arg(-1)
            .arg("WITHSCORES")
            .cmd("PEXPIRE")
            .arg(&key)
            .arg(window_ms)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        // ZRANGE is ordered by score, so earlier requests come first
        let earlier: Vec<i64> = entries
            .iter()
            .filter(|(name, _)| *name != member)
            .map(|(_, score)| *score as i64)
            .collect();

        let decision = decide(&earlier, now_ms, self.max_requests, window_ms);

        if !decision.allowed {
            redis::cmd("ZREM")
                .arg(&key)
                .arg(&member)
                .query_async::<()>(&mut *conn)
                .await?;
            drop(conn);

            tracing::info!(
                "Rate limit exceeded for {} in {} ({} requests in window)",
                identifier,
                self.scope,
                earlier.len()
            );
        }

        Ok(decision)
    }
}

/// Decide a request at `now_ms` given the admitted requests still in the window
///
/// `earlier` holds their timestamps in ascending order. A denied request is
/// not admitted, so `retry_after_secs` is the time until enough of `earlier`
/// expires to leave room for one more.
pub fn decide(earlier: &[i64], now_ms: i64, max_requests: u32, window_ms: i64) -> RateLimitDecision {
    let limit = max_requests as usize;
    let count = earlier.len() + 1;
    let allowed = count <= limit;
    let remaining = limit.saturating_sub(count) as u32;

    let retry_after_secs = if allowed {
        0
    } else {
        // Admitting a retry needs `count - limit` of the earlier requests to expire
        let blocking = earlier.get(count - limit - 1).copied().unwrap_or(now_ms);
        let wait_ms = (blocking + window_ms - now_ms).max(0) as u64;
        wait_ms.div_ceil(1000).max(1)
    };

    RateLimitDecision {
        allowed,
        remaining,
        retry_after_secs,
    }
}
