use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-IP token bucket guarding sign-in attempts.
pub struct IpRateLimiter {
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    Allowed,
    /// Rejected; a token becomes available after this long (`None` when the
    /// bucket never refills).
    Limited(Option<Duration>),
}

impl IpRateLimiter {
    pub fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            max_tokens,
            refill_rate,
        }
    }

    /// Take one token for `ip` if available.
    pub async fn check(&self, ip: IpAddr) -> RateDecision {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();
        let bucket = buckets.entry(ip).or_insert_with(|| TokenBucket {
            tokens: self.max_tokens,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return RateDecision::Allowed;
        }
        if self.refill_rate > 0.0 {
            let wait = (1.0 - bucket.tokens) / self.refill_rate;
            RateDecision::Limited(Some(Duration::from_secs_f64(wait)))
        } else {
            RateDecision::Limited(None)
        }
    }

    /// Forget buckets idle for longer than `max_age`.
    pub async fn cleanup(&self, max_age: Duration) {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();
        buckets.retain(|_, bucket| now.duration_since(bucket.last_refill) < max_age);
    }
}
