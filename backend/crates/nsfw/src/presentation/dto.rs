//! API DTOs (Data Transfer Objects)

use crate::domain::entities::{AuditLogEntry, AuditStats, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response for an approved POST /api/nsfw-check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckApprovedResponse {
    pub approved: bool,
    pub category: Category,
    /// Rounded to two decimals
    pub confidence: f64,
}

/// Response for GET /api/nsfw-check/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub stats: AuditStats,
    pub timestamp: DateTime<Utc>,
}

/// Query for GET /api/nsfw-check/audit-logs
///
/// `limit` stays a string so malformed values fall back to the default
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogsQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

/// Response for GET /api/nsfw-check/audit-logs
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogsResponse {
    pub logs: Vec<AuditLogEntry>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}
