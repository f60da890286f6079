//! Domain Entities
//!
//! Core business entities for the image-validation gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content category attached to every decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Safe,
    Nsfw,
    Uncertain,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Safe => "safe",
            Category::Nsfw => "nsfw",
            Category::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image container formats recognised by signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }
}

/// Pixel dimensions read from an image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is larger than `max`
    pub fn exceeds(&self, max: u32) -> bool {
        self.width > max || self.height > max
    }
}

/// Outcome of a single detection call
///
/// `error` is set only on hard-failure paths, and those always reject with
/// confidence `1.0`. A rejected result always carries [`Category::Nsfw`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub is_nsfw: bool,
    pub confidence: f64,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    /// Confidence reported for structural and policy failures
    pub const HARD_REJECT_CONFIDENCE: f64 = 1.0;

    /// Reject without a content judgement
    pub fn hard_reject(error: impl Into<String>) -> Self {
        Self {
            is_nsfw: true,
            confidence: Self::HARD_REJECT_CONFIDENCE,
            category: Category::Nsfw,
            error: Some(error.into()),
        }
    }

    /// Decision from a classifier verdict compared against `threshold`
    ///
    /// A verdict at or above the threshold rejects as `nsfw`. A classifier that
    /// says `nsfw` below the threshold is reported as `uncertain` and admitted.
    pub fn from_verdict(confidence: f64, category: Category, threshold: f64) -> Self {
        let is_nsfw = confidence >= threshold;
        let category = match (is_nsfw, category) {
            (true, _) => Category::Nsfw,
            (false, Category::Nsfw) => Category::Uncertain,
            (false, other) => other,
        };
        Self {
            is_nsfw,
            confidence,
            category,
            error: None,
        }
    }

    pub fn is_hard_reject(&self) -> bool {
        self.error.is_some()
    }
}

/// Append-only record of one decision
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub file_name: String,
    pub is_nsfw: bool,
    pub confidence: f64,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditLogEntry {
    /// Build an entry for a finished decision. The store re-stamps `timestamp` on append.
    pub fn from_result(
        result: &DetectionResult,
        file_name: impl Into<String>,
        user_id: Option<String>,
        file_size: u64,
        dimensions: Option<Dimensions>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id,
            file_name: file_name.into(),
            is_nsfw: result.is_nsfw,
            confidence: result.confidence,
            file_size,
            dimensions,
            error: result.error.clone(),
        }
    }
}

/// Aggregate counters over the audit log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total_checks: usize,
    pub blocked_count: usize,
    pub allowed_count: usize,
    /// Percentage of blocked checks, `0` when nothing was checked
    pub block_rate: f64,
}

impl AuditStats {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a AuditLogEntry>) -> Self {
        let (total_checks, blocked_count) = entries
            .into_iter()
            .fold((0usize, 0usize), |(total, blocked), entry| {
                (total + 1, blocked + usize::from(entry.is_nsfw))
            });

        let block_rate = if total_checks > 0 {
            100.0 * blocked_count as f64 / total_checks as f64
        } else {
            0.0
        };

        Self {
            total_checks,
            blocked_count,
            allowed_count: total_checks - blocked_count,
            block_rate,
        }
    }
}
