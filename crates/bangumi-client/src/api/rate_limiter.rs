//! Client-side request pacing.
//!
//! Enforces a minimum spacing between requests plus a rolling per-minute
//! budget, so bursts from subject refreshes cannot trip the catalog's limits.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests (zero disables it)
    min_interval: Duration,
    /// Maximum requests per rolling minute (zero disables it)
    max_per_minute: usize,
    /// Request timestamps in the last minute, oldest first
    recent: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 && max_per_second.is_finite() {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };

        Self {
            min_interval,
            max_per_minute: max_per_minute as usize,
            recent: VecDeque::with_capacity(max_per_minute as usize),
        }
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(0.0, 0)
    }

    /// Wait until a request may be made, then record it.
    ///
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let started = Instant::now();
        self.prune(started);

        let mut wait = Duration::ZERO;

        if self.max_per_minute > 0 && self.recent.len() >= self.max_per_minute {
            if let Some(&oldest) = self.recent.front() {
                wait = wait.max(WINDOW.saturating_sub(started.duration_since(oldest)));
            }
        }

        if let Some(&last) = self.recent.back() {
            wait = wait.max(self.min_interval.saturating_sub(started.duration_since(last)));
        }

        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit: delaying request");
            sleep(wait).await;
        }

        let now = Instant::now();
        self.prune(now);
        self.recent.push_back(now);
        now.duration_since(started)
    }

    /// Number of requests made in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.recent.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent.front() {
            if now.duration_since(oldest) < WINDOW {
                break;
            }
            self.recent.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_per_second() {
        let mut limiter = RateLimiter::new(20.0, 100);

        let start = Instant::now();

        // Three requests at 50ms spacing take at least 100ms
        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_first_request_is_immediate() {
        let mut limiter = RateLimiter::new(1.0, 10);
        let waited = limiter.acquire().await;
        assert!(waited < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_unlimited_never_waits() {
        let mut limiter = RateLimiter::unlimited();
        for _ in 0..20 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.current_minute_count(), 20);
    }

    #[test]
    fn test_current_minute_count() {
        let mut limiter = RateLimiter::new(2.0, 50);
        assert_eq!(limiter.current_minute_count(), 0);
    }
}
