use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

use crate::errors::AppError;

/// Throttles outbound news and price requests: caps in-flight requests and
/// spaces request starts at least `60s / requests_per_minute` apart.
#[derive(Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Instant>>,
    min_delay: Duration,
}

impl RateLimiter {
    /// `requests_per_minute` of zero disables spacing; only the concurrency cap applies.
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay = match requests_per_minute {
            0 => Duration::ZERO,
            rpm => Duration::from_millis(60_000 / rpm as u64),
        };
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(Instant::now() - Duration::from_secs(60))),
            min_delay,
        }
    }

    /// Wait for a free slot and for the spacing interval to pass.
    /// The slot is released when the returned guard is dropped.
    pub async fn acquire(&self) -> Result<RateLimitGuard, AppError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::External(format!("Rate limiter closed: {}", e)))?;

        // Reserve the next start slot under the lock, sleep outside it
        let wait_time = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let next_slot = (*last + self.min_delay).max(now);
            *last = next_slot;
            next_slot - now
        };

        if !wait_time.is_zero() {
            sleep(wait_time).await;
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}
