//! Audit Query Use Case

use crate::application::config::NsfwConfig;
use crate::domain::entities::{AuditLogEntry, AuditStats};
use crate::domain::repository::AuditLogRepository;
use crate::error::NsfwResult;
use std::sync::Arc;

/// Read side of the audit log: statistics and bounded retrieval
pub struct AuditQueryUseCase<A>
where
    A: AuditLogRepository,
{
    audit_repo: Arc<A>,
    config: Arc<NsfwConfig>,
}

impl<A> AuditQueryUseCase<A>
where
    A: AuditLogRepository,
{
    pub fn new(audit_repo: Arc<A>, config: Arc<NsfwConfig>) -> Self {
        Self { audit_repo, config }
    }

    pub async fn stats(&self) -> NsfwResult<AuditStats> {
        self.audit_repo.stats().await
    }

    /// Most recent entries for a raw `limit` query value
    pub async fn recent(&self, raw_limit: Option<&str>) -> NsfwResult<Vec<AuditLogEntry>> {
        let limit = self.resolve_limit(raw_limit);
        self.audit_repo.query(limit).await
    }

    /// Parse a caller-supplied limit
    ///
    /// Leading integer digits are honoured (`"25abc"` is 25). Missing or
    /// non-numeric input uses the default; the result is clamped to
    /// `[1, audit_query_max_limit]`.
    pub fn resolve_limit(&self, raw_limit: Option<&str>) -> usize {
        let max = self.config.audit_query_max_limit as i64;
        let limit = raw_limit
            .and_then(parse_leading_int)
            .unwrap_or(self.config.audit_query_default_limit as i64);
        limit.clamp(1, max.max(1)) as usize
    }
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Saturate rather than fail on absurdly long digit runs
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7"), Some(7));
        assert_eq!(parse_leading_int("25abc"), Some(25));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }
}
