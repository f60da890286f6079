//! Detect Image Use Case
//!
//! The decision engine. Checks run in a fixed order and the first failing
//! check decides: declared size, emptiness, format, optional dimension limit,
//! then the content classifier. Every call produces exactly one audit entry.

use crate::application::config::NsfwConfig;
use crate::domain::classifier::ContentClassifier;
use crate::domain::entities::{AuditLogEntry, DetectionResult, Dimensions};
use crate::domain::repository::AuditLogRepository;
use crate::domain::services::{FormatCheck, read_dimensions, validate_format};
use platform::client::ANONYMOUS_KEY;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub const ERR_FILE_TOO_LARGE: &str = "File size exceeds limit";
pub const ERR_EMPTY_FILE: &str = "Empty file";
pub const ERR_INVALID_FORMAT: &str = "Invalid image format";
pub const ERR_DIMENSIONS_TOO_LARGE: &str = "Image dimensions exceed limit";
pub const ERR_INVALID_CONFIDENCE: &str = "Classifier returned an invalid confidence";

/// Input DTO for image detection
#[derive(Debug, Clone)]
pub struct DetectImageInput {
    pub buffer: Vec<u8>,
    pub file_name: String,
    pub user_id: Option<String>,
    /// Size reported by the upload layer, checked before the bytes are inspected
    pub declared_file_size: Option<u64>,
}

/// Detect Image Use Case
pub struct DetectImageUseCase<A>
where
    A: AuditLogRepository,
{
    audit_repo: Arc<A>,
    classifier: Arc<dyn ContentClassifier>,
    config: Arc<NsfwConfig>,
}

impl<A> DetectImageUseCase<A>
where
    A: AuditLogRepository,
{
    pub fn new(
        audit_repo: Arc<A>,
        classifier: Arc<dyn ContentClassifier>,
        config: Arc<NsfwConfig>,
    ) -> Self {
        Self {
            audit_repo,
            classifier,
            config,
        }
    }

    /// Run the checks and record the outcome
    ///
    /// Never fails: every failure mode, including a panic inside inspection or
    /// classification, is returned as a hard reject.
    pub async fn execute(&self, input: DetectImageInput) -> DetectionResult {
        let (result, dimensions) = self.evaluate(&input);

        let file_size = input
            .declared_file_size
            .unwrap_or(input.buffer.len() as u64);

        let entry = AuditLogEntry::from_result(
            &result,
            input.file_name.as_str(),
            input.user_id.clone(),
            file_size,
            dimensions,
        );

        if let Err(e) = self.audit_repo.append(entry).await {
            tracing::error!(
                error = %e,
                file_name = %input.file_name,
                "Failed to write audit entry"
            );
        }

        if result.is_nsfw {
            tracing::warn!(
                user_id = input.user_id.as_deref().unwrap_or(ANONYMOUS_KEY),
                file_name = %input.file_name,
                file_size,
                confidence = result.confidence,
                reason = result.error.as_deref().unwrap_or("content"),
                "Image rejected"
            );
        } else {
            tracing::info!(
                user_id = input.user_id.as_deref().unwrap_or(ANONYMOUS_KEY),
                file_name = %input.file_name,
                file_size,
                confidence = result.confidence,
                category = %result.category,
                "Image approved"
            );
        }

        result
    }

    fn evaluate(&self, input: &DetectImageInput) -> (DetectionResult, Option<Dimensions>) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_checks(input))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    classifier = self.classifier.name(),
                    error = %message,
                    "Detection panicked, rejecting"
                );
                (DetectionResult::hard_reject(message), None)
            }
        }
    }

    fn run_checks(&self, input: &DetectImageInput) -> (DetectionResult, Option<Dimensions>) {
        if let Some(size) = input.declared_file_size {
            if size > self.config.max_image_size_bytes() {
                return (DetectionResult::hard_reject(ERR_FILE_TOO_LARGE), None);
            }
        }

        if input.buffer.is_empty() {
            return (DetectionResult::hard_reject(ERR_EMPTY_FILE), None);
        }

        let format = match validate_format(&input.buffer) {
            FormatCheck {
                valid: true,
                format: Some(format),
            } => format,
            _ => return (DetectionResult::hard_reject(ERR_INVALID_FORMAT), None),
        };

        let dimensions = read_dimensions(&input.buffer);

        if self.config.enforce_max_dimension
            && dimensions.is_some_and(|d| d.exceeds(self.config.max_image_dimension))
        {
            return (
                DetectionResult::hard_reject(ERR_DIMENSIONS_TOO_LARGE),
                dimensions,
            );
        }

        let result = match self.classifier.classify(&input.buffer, format) {
            Ok(verdict) if verdict.confidence.is_finite() => DetectionResult::from_verdict(
                verdict.confidence.clamp(0.0, 1.0),
                verdict.category,
                self.config.confidence_threshold,
            ),
            Ok(_) => DetectionResult::hard_reject(ERR_INVALID_CONFIDENCE),
            Err(e) => DetectionResult::hard_reject(e.to_string()),
        };

        (result, dimensions)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown detection failure".to_string()
    }
}
