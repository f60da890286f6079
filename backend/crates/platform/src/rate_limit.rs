//! Rate Limiting Infrastructure
//!
//! Fixed-window rate limiting: each key gets `max_requests` calls per
//! non-overlapping window. Counters are reset wholesale once the window passes.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

/// Rate limit storage failure
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit backend unavailable: {0}")]
    Backend(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

/// Counter state for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow {
    pub count: u32,
    pub reset_at_ms: i64,
}

impl FixedWindow {
    /// Open a new window with the current call already counted
    pub fn start(now_ms: i64, config: &RateLimitConfig) -> Self {
        Self {
            count: 1,
            reset_at_ms: now_ms + config.window_ms(),
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.reset_at_ms
    }

    /// Register a call inside this window.
    ///
    /// A denied call does not increment the counter.
    pub fn hit(&mut self, now_ms: i64, config: &RateLimitConfig) -> RateLimitResult {
        if self.is_expired(now_ms) {
            *self = Self::start(now_ms, config);
            return self.result(true, config);
        }

        if self.count >= config.max_requests {
            return self.result(false, config);
        }

        self.count += 1;
        self.result(true, config)
    }

    fn result(&self, allowed: bool, config: &RateLimitConfig) -> RateLimitResult {
        RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(self.count),
            reset_at_ms: self.reset_at_ms,
        }
    }
}

/// Process-local rate limit store
///
/// All state lives in memory and is lost on restart. Stale windows are only
/// dropped by [`InMemoryRateLimitStore::sweep_expired`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimitStore {
    windows: Arc<Mutex<HashMap<String, FixedWindow>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a key against an explicit clock value (milliseconds since epoch)
    pub async fn check_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        let mut windows = self.windows.lock().await;

        let result = match windows.get_mut(key) {
            Some(window) => window.hit(now_ms, config),
            None => {
                let window = FixedWindow::start(now_ms, config);
                let result = RateLimitResult {
                    allowed: true,
                    remaining: config.max_requests.saturating_sub(window.count),
                    reset_at_ms: window.reset_at_ms,
                };
                windows.insert(key.to_string(), window);
                result
            }
        };

        if !result.allowed {
            tracing::debug!(key = %key, reset_at_ms = result.reset_at_ms, "Rate limit denied");
        }

        result
    }

    /// Current counter state for a key
    pub async fn window(&self, key: &str) -> Option<FixedWindow> {
        self.windows.lock().await.get(key).copied()
    }

    /// Drop every window whose reset time has passed. Returns the number removed.
    pub async fn sweep_expired(&self, now_ms: i64) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now_ms));
        before - windows.len()
    }

    pub async fn len(&self) -> usize {
        self.windows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.windows.lock().await.clear();
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self
            .check_at(key, config, Utc::now().timestamp_millis())
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 30);
        assert_eq!(config.window_ms(), 60_000);
    }

    #[test]
    fn test_window_denies_without_incrementing() {
        let config = RateLimitConfig::new(2, 60);
        let mut window = FixedWindow::start(T0, &config);

        assert!(window.hit(T0 + 1, &config).allowed);
        assert_eq!(window.count, 2);

        let denied = window.hit(T0 + 2, &config);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(window.count, 2);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let config = RateLimitConfig::new(1, 60);
        let mut window = FixedWindow::start(T0, &config);

        // Exactly at reset time the old window still applies
        assert!(!window.hit(T0 + 60_000, &config).allowed);

        let result = window.hit(T0 + 60_001, &config);
        assert!(result.allowed);
        assert_eq!(window.count, 1);
        assert_eq!(window.reset_at_ms, T0 + 60_001 + 60_000);
    }

    #[tokio::test]
    async fn test_thirty_first_call_denied() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::default();

        for i in 0..30 {
            let result = store.check_at("user-1", &config, T0 + i).await;
            assert!(result.allowed, "call {} should be allowed", i + 1);
        }

        let result = store.check_at("user-1", &config, T0 + 30).await;
        assert!(!result.allowed);
        assert_eq!(store.window("user-1").await.unwrap().count, 30);
    }

    #[tokio::test]
    async fn test_window_reset_after_elapse() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::default();

        for i in 0..31 {
            store.check_at("user-1", &config, T0 + i).await;
        }

        let result = store.check_at("user-1", &config, T0 + 60_001).await;
        assert!(result.allowed);
        assert_eq!(result.remaining, 29);
        assert_eq!(store.window("user-1").await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("a", &config, T0).await.allowed);
        assert!(!store.check_at("a", &config, T0).await.allowed);
        assert!(store.check_at("b", &config, T0).await.allowed);
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(5, 60);

        store.check_at("old", &config, T0).await;
        store.check_at("fresh", &config, T0 + 50_000).await;
        assert_eq!(store.len().await, 2);

        let removed = store.sweep_expired(T0 + 60_001).await;
        assert_eq!(removed, 1);
        assert!(store.window("old").await.is_none());
        assert!(store.window("fresh").await.is_some());

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_trait_uses_wall_clock() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        let first = RateLimitStore::check_and_increment(&store, "k", &config)
            .await
            .unwrap();
        assert!(first.allowed);
        assert!(first.reset_at_ms > Utc::now().timestamp_millis());

        let second = RateLimitStore::check_and_increment(&store, "k", &config)
            .await
            .unwrap();
        assert!(!second.allowed);
    }
}
