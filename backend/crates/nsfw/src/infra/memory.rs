//! In-Memory Repository Implementation
//!
//! Process-local audit log and rate limit state. Both are lost on restart.

use crate::application::config::NsfwConfig;
use crate::domain::entities::{AuditLogEntry, AuditStats};
use crate::domain::repository::{AuditLogRepository, RateLimitRepository};
use crate::error::NsfwResult;
use chrono::Utc;
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Gate state owned by one service object per process
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct InMemoryNsfwRepository {
    audit_log: Arc<Mutex<VecDeque<AuditLogEntry>>>,
    audit_capacity: usize,
    rate_limits: InMemoryRateLimitStore,
    rate_limit_config: RateLimitConfig,
}

impl InMemoryNsfwRepository {
    pub fn new(audit_capacity: usize, rate_limit_config: RateLimitConfig) -> Self {
        Self {
            audit_log: Arc::new(Mutex::new(VecDeque::new())),
            audit_capacity,
            rate_limits: InMemoryRateLimitStore::new(),
            rate_limit_config,
        }
    }

    pub fn from_config(config: &NsfwConfig) -> Self {
        Self::new(config.audit_log_capacity, config.rate_limit())
    }

    /// Number of retained audit entries
    pub async fn audit_len(&self) -> usize {
        self.audit_log.lock().await.len()
    }

    /// Every retained entry, oldest first
    pub async fn audit_snapshot(&self) -> Vec<AuditLogEntry> {
        self.audit_log.lock().await.iter().cloned().collect()
    }

    /// Rate limit state, exposed for sweeping and inspection
    pub fn rate_limits(&self) -> &InMemoryRateLimitStore {
        &self.rate_limits
    }

    /// Drop rate limit windows that have already expired
    pub async fn sweep_rate_limits(&self) -> usize {
        let removed = self
            .rate_limits
            .sweep_expired(Utc::now().timestamp_millis())
            .await;
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate limit windows");
        }
        removed
    }
}

impl AuditLogRepository for InMemoryNsfwRepository {
    async fn append(&self, mut entry: AuditLogEntry) -> NsfwResult<()> {
        let mut log = self.audit_log.lock().await;

        let now = Utc::now();
        entry.timestamp = match log.back() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        log.push_back(entry);

        if log.len() > self.audit_capacity {
            let excess = log.len() - self.audit_capacity;
            log.drain(..excess);
            tracing::debug!(evicted = excess, "Audit log truncated");
        }

        Ok(())
    }

    async fn query(&self, limit: usize) -> NsfwResult<Vec<AuditLogEntry>> {
        let log = self.audit_log.lock().await;
        Ok(log.iter().rev().take(limit).cloned().collect())
    }

    async fn clear(&self) -> NsfwResult<()> {
        self.audit_log.lock().await.clear();
        tracing::info!("Audit log cleared");
        Ok(())
    }

    async fn stats(&self) -> NsfwResult<AuditStats> {
        let log = self.audit_log.lock().await;
        Ok(AuditStats::from_entries(log.iter()))
    }
}

impl RateLimitRepository for InMemoryNsfwRepository {
    async fn check(&self, key: &str) -> NsfwResult<bool> {
        let result = self
            .rate_limits
            .check_and_increment(key, &self.rate_limit_config)
            .await?;
        Ok(result.allowed)
    }
}
