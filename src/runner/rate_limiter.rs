//! @ai:module:intent Request pacing for remote model APIs
//! @ai:module:layer infrastructure
//! @ai:module:public_api RateLimiter
//! @ai:module:stateless false

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// @ai:intent Token bucket limiter shared by every call a client makes
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    requests_per_minute: u32,
}

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// @ai:intent Create a limiter; zero requests per minute disables pacing
    /// @ai:effects pure
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: requests_per_minute as f64,
                refilled_at: Instant::now(),
            }),
            requests_per_minute,
        }
    }

    fn per_second(&self) -> f64 {
        self.requests_per_minute as f64 / 60.0
    }

    /// @ai:intent Wait until a request slot is free, then take it
    /// @ai:effects state:write, time
    pub async fn acquire(&self) {
        if self.requests_per_minute == 0 {
            return;
        }

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let refill = now.duration_since(bucket.refilled_at).as_secs_f64() * self.per_second();
                bucket.tokens = (bucket.tokens + refill).min(self.requests_per_minute as f64);
                bucket.refilled_at = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                Duration::from_secs_f64((1.0 - bucket.tokens) / self.per_second())
            };

            tracing::debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}
