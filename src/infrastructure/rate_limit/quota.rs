//! Rolling-window submission quota
//!
//! Nothing is persisted: every check counts the user's posts created inside
//! the trailing window. Two posts created concurrently at the boundary can
//! both pass.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use crate::domain::blog::Blog;
use crate::domain::storage::{DocumentQuery, Storage};
use crate::domain::DomainError;

pub const DEFAULT_SUBMISSIONS_PER_WINDOW: u32 = 5;
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Quota parameters
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub limit: u32,
    pub window: Duration,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SUBMISSIONS_PER_WINDOW,
            window: Duration::hours(DEFAULT_WINDOW_HOURS),
        }
    }
}

impl QuotaConfig {
    pub fn new(limit: u32, window_hours: i64) -> Self {
        Self {
            limit,
            window: Duration::hours(window_hours),
        }
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub window_start: DateTime<Utc>,
}

impl QuotaStatus {
    fn from_count(count: u32, limit: u32, window_start: DateTime<Utc>) -> Self {
        Self {
            allowed: count < limit,
            remaining: limit.saturating_sub(count),
            limit,
            window_start,
        }
    }

    fn exhausted(limit: u32, window_start: DateTime<Utc>) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            limit,
            window_start,
        }
    }
}

/// Per-user blog submission quota over a trailing window
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    blogs: Arc<dyn Storage<Blog>>,
    clock: Arc<dyn Clock>,
    config: QuotaConfig,
}

impl RateLimitGuard {
    pub fn new(blogs: Arc<dyn Storage<Blog>>, config: QuotaConfig) -> Self {
        Self {
            blogs,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> QuotaConfig {
        self.config
    }

    fn window_query(user_id: &str, since: DateTime<Utc>) -> DocumentQuery {
        DocumentQuery::new()
            .eq("author_id", user_id)
            .gte("created_at", since)
    }

    /// Counts the user's posts inside the window. Any store failure denies.
    pub async fn check_quota(&self, user_id: &str) -> QuotaStatus {
        let since = self.clock.now() - self.config.window;
        let query = Self::window_query(user_id, since);

        match self.blogs.count_matching(&query).await {
            Ok(count) => {
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                debug!(user_id, count, limit = self.config.limit, "Quota checked");
                QuotaStatus::from_count(count, self.config.limit, since)
            }
            Err(e) => {
                warn!(user_id, error = %e, "Quota check failed; denying");
                QuotaStatus::exhausted(self.config.limit, since)
            }
        }
    }

    /// Fails with `RateLimited` when the user has no quota left
    pub async fn enforce(&self, user_id: &str) -> Result<QuotaStatus, DomainError> {
        let status = self.check_quota(user_id).await;

        if status.allowed {
            return Ok(status);
        }

        let retry_after = self.retry_after(user_id, status.window_start).await;

        Err(DomainError::rate_limited(
            format!(
                "Submission limit of {} per {} hours reached",
                self.config.limit,
                self.config.window.num_hours()
            ),
            retry_after,
        ))
    }

    /// Seconds until the oldest post in the window ages out; the full window
    /// when that cannot be determined
    async fn retry_after(&self, user_id: &str, since: DateTime<Utc>) -> u64 {
        let full_window = self.config.window.num_seconds().max(1) as u64;
        let query = Self::window_query(user_id, since);

        let Ok(found) = self.blogs.find(&query).await else {
            return full_window;
        };

        let Some(oldest) = found.items.iter().map(|b| b.created_at()).min() else {
            return full_window;
        };

        let wait = (oldest + self.config.window - self.clock.now()).num_seconds();
        wait.clamp(1, full_window as i64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;
    use crate::infrastructure::rate_limit::FixedClock;
    use crate::infrastructure::storage::InMemoryStorage;

    fn post(author: &str, created_at: DateTime<Utc>) -> Blog {
        Blog::new("Title", "Body", author, "Author", "a@example.com").with_created_at(created_at)
    }

    fn guard(posts: Vec<Blog>, now: DateTime<Utc>) -> RateLimitGuard {
        RateLimitGuard::new(
            Arc::new(InMemoryStorage::with_entities(posts)),
            QuotaConfig::default(),
        )
        .with_clock(Arc::new(FixedClock::new(now)))
    }

    #[tokio::test]
    async fn test_quota_for_counts_zero_to_five() {
        let now = Utc::now();

        for count in 0..=5u32 {
            let posts = (0..count)
                .map(|i| post("u1", now - Duration::hours(i as i64 + 1)))
                .collect();
            let status = guard(posts, now).check_quota("u1").await;

            assert_eq!(status.allowed, count < 5, "count {}", count);
            assert_eq!(status.remaining, 5 - count, "count {}", count);
            assert_eq!(status.limit, 5);
        }
    }

    #[tokio::test]
    async fn test_old_posts_do_not_count() {
        let now = Utc::now();
        let mut posts: Vec<Blog> = (0..4).map(|i| post("u1", now - Duration::hours(i + 1))).collect();
        posts.push(post("u1", now - Duration::hours(25)));
        posts.push(post("u1", now - Duration::days(3)));

        let status = guard(posts, now).check_quota("u1").await;

        assert!(status.allowed);
        assert_eq!(status.remaining, 1);
    }

    #[tokio::test]
    async fn test_five_recent_plus_stale_sixth() {
        let now = Utc::now();
        let mut posts: Vec<Blog> = (0..5).map(|i| post("u1", now - Duration::hours(i + 1))).collect();
        posts.push(post("u1", now - Duration::hours(30)));

        let status = guard(posts, now).check_quota("u1").await;

        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);
    }

    #[tokio::test]
    async fn test_remaining_clamps_at_zero() {
        let now = Utc::now();
        let posts = (0..8).map(|i| post("u1", now - Duration::minutes(i + 1))).collect();

        let status = guard(posts, now).check_quota("u1").await;
        assert_eq!(status.remaining, 0);
    }

    #[tokio::test]
    async fn test_other_authors_do_not_count() {
        let now = Utc::now();
        let posts = (0..5).map(|i| post("u2", now - Duration::hours(i + 1))).collect();

        let status = guard(posts, now).check_quota("u1").await;
        assert_eq!(status.remaining, 5);
    }

    #[tokio::test]
    async fn test_window_moves_with_the_clock() {
        let now = Utc::now();
        let clock = Arc::new(FixedClock::new(now));
        let posts: Vec<Blog> = (0..5).map(|i| post("u1", now - Duration::hours(20 + i))).collect();

        let guard = RateLimitGuard::new(
            Arc::new(InMemoryStorage::with_entities(posts)),
            QuotaConfig::default(),
        )
        .with_clock(clock.clone());

        assert!(!guard.check_quota("u1").await.allowed);

        // Window now starts 21h before the original instant: two posts remain
        clock.advance(Duration::hours(3));
        let status = guard.check_quota("u1").await;
        assert!(status.allowed);
        assert_eq!(status.remaining, 3);
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let guard = RateLimitGuard::new(
            Arc::new(MockStorage::<Blog>::new().with_error("connection refused")),
            QuotaConfig::default(),
        );

        let status = guard.check_quota("u1").await;
        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);

        let err = guard.enforce("u1").await.unwrap_err();
        assert!(matches!(err, DomainError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_enforce_reports_retry_after() {
        let now = Utc::now();
        let posts = (0..5).map(|i| post("u1", now - Duration::hours(23) + Duration::minutes(i))).collect();

        let err = guard(posts, now).enforce("u1").await.unwrap_err();

        match err {
            DomainError::RateLimited { retry_after_secs, .. } => {
                assert_eq!(retry_after_secs, 3600);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enforce_allows_under_limit() {
        let status = guard(Vec::new(), Utc::now()).enforce("u1").await.unwrap();
        assert_eq!(status.remaining, 5);
    }

    #[tokio::test]
    async fn test_custom_limit() {
        let now = Utc::now();
        let guard = RateLimitGuard::new(
            Arc::new(InMemoryStorage::with_entities(vec![post("u1", now)])),
            QuotaConfig::new(1, 1),
        )
        .with_clock(Arc::new(FixedClock::new(now)));

        assert!(!guard.check_quota("u1").await.allowed);
    }
}
