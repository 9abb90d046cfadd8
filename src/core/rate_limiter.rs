use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::core::config::rate_limit;

/// Sliding-window limiter for starting new payment requests.
///
/// Keeps, per user, the timestamps of recently accepted attempts. An attempt is
/// accepted only while fewer than `max_requests` timestamps fall inside the
/// trailing `window`. State lives in memory for the lifetime of the process.
#[derive(Clone)]
pub struct RateLimiter {
    /// Accepted attempt timestamps per user, oldest first
    attempts: Arc<Mutex<HashMap<i64, VecDeque<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter with the default policy (3 attempts per 5 minutes).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use telepay::core::rate_limiter::RateLimiter;
    ///
    /// let limiter = RateLimiter::new();
    /// ```
    pub fn new() -> Self {
        Self::with_limits(rate_limit::MAX_REQUESTS, rate_limit::window())
    }

    /// Creates a limiter with a custom policy.
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Attempts allowed inside one window
    /// * `window` - Length of the sliding window
    pub fn with_limits(max_requests: usize, window: Duration) -> Self {
        Self {
            attempts: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Checks the user against the window and records the attempt when it is allowed.
    ///
    /// Returns `true` if the attempt is accepted, `false` if the user must wait.
    pub async fn check(&self, user_id: i64) -> bool {
        self.check_at(user_id, Instant::now()).await
    }

    /// Same as [`RateLimiter::check`] with an explicit clock reading.
    pub async fn check_at(&self, user_id: i64, now: Instant) -> bool {
        let mut attempts = self.attempts.lock().await;
        // Users whose newest attempt has left the window have nothing left to count
        attempts.retain(|_, history| {
            history
                .back()
                .is_some_and(|last| now.saturating_duration_since(*last) < self.window)
        });
        let history = attempts.entry(user_id).or_default();

        while let Some(&oldest) = history.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                history.pop_front();
            } else {
                break;
            }
        }

        if history.len() >= self.max_requests {
            return false;
        }

        history.push_back(now);
        true
    }

    /// Time until the oldest attempt leaves the window, if the user is currently limited.
    pub async fn remaining_time(&self, user_id: i64) -> Option<Duration> {
        self.remaining_time_at(user_id, Instant::now()).await
    }

    /// Same as [`RateLimiter::remaining_time`] with an explicit clock reading.
    pub async fn remaining_time_at(&self, user_id: i64, now: Instant) -> Option<Duration> {
        let attempts = self.attempts.lock().await;
        let history = attempts.get(&user_id)?;

        let live: Vec<&Instant> = history
            .iter()
            .filter(|at| now.saturating_duration_since(**at) < self.window)
            .collect();
        if live.len() < self.max_requests {
            return None;
        }

        live.first()
            .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(**oldest)))
    }

    /// Drops all recorded attempts for the user.
    pub async fn reset(&self, user_id: i64) {
        let mut attempts = self.attempts.lock().await;
        attempts.remove(&user_id);
    }
}

#[cfg(test)]
impl RateLimiter {
    async fn tracked_users(&self) -> usize {
        self.attempts.lock().await.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fourth_attempt_inside_window_is_rejected() {
        let limiter = RateLimiter::with_limits(3, Duration::from_secs(300));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).await);
        assert!(limiter.check_at(1, start + Duration::from_secs(10)).await);
        assert!(limiter.check_at(1, start + Duration::from_secs(20)).await);
        assert!(!limiter.check_at(1, start + Duration::from_secs(299)).await);
    }

    #[tokio::test]
    async fn test_attempt_accepted_after_window_elapses() {
        let limiter = RateLimiter::with_limits(3, Duration::from_secs(300));
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at(1, start).await);
        }
        assert!(!limiter.check_at(1, start + Duration::from_secs(100)).await);
        assert!(limiter.check_at(1, start + Duration::from_secs(300)).await);
    }

    #[tokio::test]
    async fn test_rejected_attempts_are_not_recorded() {
        let limiter = RateLimiter::with_limits(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at(1, start).await);
        // Hammering while limited must not extend the block
        assert!(!limiter.check_at(1, start + Duration::from_secs(30)).await);
        assert!(!limiter.check_at(1, start + Duration::from_secs(59)).await);
        assert!(limiter.check_at(1, start + Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let limiter = RateLimiter::with_limits(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check_at(1, now).await);
        assert!(!limiter.check_at(1, now).await);
        assert!(limiter.check_at(2, now).await);
    }

    #[tokio::test]
    async fn test_remaining_time_and_reset() {
        let limiter = RateLimiter::with_limits(1, Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(limiter.remaining_time_at(1, start).await, None);
        assert!(limiter.check_at(1, start).await);
        assert_eq!(
            limiter.remaining_time_at(1, start + Duration::from_secs(20)).await,
            Some(Duration::from_secs(40))
        );

        limiter.reset(1).await;
        assert!(limiter.check_at(1, start + Duration::from_secs(20)).await);
    }

    #[tokio::test]
    async fn test_idle_users_are_forgotten() {
        let limiter = RateLimiter::with_limits(3, Duration::from_secs(60));
        let start = Instant::now();

        for user_id in 1..=5 {
            assert!(limiter.check_at(user_id, start).await);
        }
        assert_eq!(limiter.tracked_users().await, 5);

        assert!(limiter.check_at(9, start + Duration::from_secs(61)).await);
        assert_eq!(limiter.tracked_users().await, 1);
    }
}
