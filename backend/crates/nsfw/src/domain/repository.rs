//! Repository Traits
//!
//! Interfaces for gate state. Implementation is in infrastructure layer.

use crate::domain::entities::{AuditLogEntry, AuditStats};
use crate::error::NsfwResult;

/// Audit log repository trait
#[trait_variant::make(AuditLogRepository: Send)]
pub trait LocalAuditLogRepository {
    /// Append an entry, stamping its timestamp at insert time
    async fn append(&self, entry: AuditLogEntry) -> NsfwResult<()>;

    /// Up to `limit` most recent entries, newest first
    async fn query(&self, limit: usize) -> NsfwResult<Vec<AuditLogEntry>>;

    /// Remove every entry
    async fn clear(&self) -> NsfwResult<()>;

    /// Aggregate counters over the current contents
    async fn stats(&self) -> NsfwResult<AuditStats>;
}

/// Rate limit repository trait
#[trait_variant::make(RateLimitRepository: Send)]
pub trait LocalRateLimitRepository {
    /// Check rate limit for a caller key
    /// Returns true if request is allowed
    async fn check(&self, key: &str) -> NsfwResult<bool>;
}
