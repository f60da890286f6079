//! Application Configuration
//!
//! Configuration for the image-validation gate.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

const MIB: u64 = 1024 * 1024;

/// Gate configuration
#[derive(Debug, Clone)]
pub struct NsfwConfig {
    /// Classifier confidence at or above which an image is rejected
    pub confidence_threshold: f64,
    /// Maximum accepted file size in MiB
    pub max_image_size_mb: u64,
    /// Maximum accepted width or height in pixels
    pub max_image_dimension: u32,
    /// Reject images whose header dimensions exceed `max_image_dimension`
    pub enforce_max_dimension: bool,
    /// Rate limit: max checks per window per caller
    pub rate_limit_max_requests: u32,
    /// Rate limit window
    pub rate_limit_window: Duration,
    /// Audit entries retained in memory
    pub audit_log_capacity: usize,
    /// Entries returned by the audit log endpoint when no limit is given
    pub audit_query_default_limit: usize,
    /// Upper bound for a caller-supplied audit log limit
    pub audit_query_max_limit: usize,
}

impl Default for NsfwConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            max_image_size_mb: 50,
            max_image_dimension: 4096,
            enforce_max_dimension: false,
            rate_limit_max_requests: 30,
            rate_limit_window: Duration::from_secs(60),
            audit_log_capacity: 10_000,
            audit_query_default_limit: 100,
            audit_query_max_limit: 1000,
        }
    }
}

impl NsfwConfig {
    /// Create config from defaults overridden by environment variables
    ///
    /// Reads `NSFW_MAX_IMAGE_SIZE_MB`, `NSFW_RATE_LIMIT_MAX_REQUESTS`,
    /// `NSFW_RATE_LIMIT_WINDOW_SECS` and `NSFW_ENFORCE_MAX_DIMENSION`.
    /// Unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_image_size_mb: env_or("NSFW_MAX_IMAGE_SIZE_MB", defaults.max_image_size_mb),
            rate_limit_max_requests: env_or(
                "NSFW_RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window: Duration::from_secs(env_or(
                "NSFW_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )),
            enforce_max_dimension: env_or(
                "NSFW_ENFORCE_MAX_DIMENSION",
                defaults.enforce_max_dimension,
            ),
            ..defaults
        }
    }

    pub fn max_image_size_bytes(&self) -> u64 {
        self.max_image_size_mb.saturating_mul(MIB)
    }

    /// Request body limit for the upload route
    ///
    /// Set above the policy limit so oversized files reach the size check.
    pub fn request_body_limit_bytes(&self) -> usize {
        let limit = self.max_image_size_bytes().saturating_add(16 * MIB);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }

    /// Seconds a rate-limited caller is told to wait
    pub fn retry_after_secs(&self) -> u64 {
        self.rate_limit_window.as_secs()
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max_requests,
            window: self.rate_limit_window,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key = %key, value = %raw, "Ignoring unparsable config value");
                default
            }
        },
        Err(_) => default,
    }
}
