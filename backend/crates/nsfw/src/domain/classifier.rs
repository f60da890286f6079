//! Content Classifier
//!
//! Extension point for content scoring. The decision engine only calls a
//! classifier after the buffer passed the structural checks.

use crate::domain::entities::{Category, ImageFormat};
use thiserror::Error;

/// Classifier verdict for one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Confidence in `[0, 1]` that the content is prohibited
    pub confidence: f64,
    pub category: Category,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classification failed: {0}")]
    Failed(String),
}

/// Scores an already format-validated image
pub trait ContentClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(
        &self,
        buffer: &[u8],
        format: ImageFormat,
    ) -> Result<Classification, ClassifierError>;
}

/// Placeholder classifier: every structurally valid image scores a fixed low confidence
#[derive(Debug, Clone)]
pub struct StubClassifier {
    confidence: f64,
}

impl StubClassifier {
    pub const DEFAULT_CONFIDENCE: f64 = 0.15;

    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }
}

impl Default for StubClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONFIDENCE)
    }
}

impl ContentClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn classify(
        &self,
        _buffer: &[u8],
        _format: ImageFormat,
    ) -> Result<Classification, ClassifierError> {
        Ok(Classification {
            confidence: self.confidence,
            category: Category::Safe,
        })
    }
}
