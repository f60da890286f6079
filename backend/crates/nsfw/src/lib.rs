//! Image Validation Gate
//!
//! Decides whether an uploaded image may enter the system.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, format validation, classifier and repository traits
//! - `application/` - Configuration and use cases (decision engine, audit queries)
//! - `infra/` - In-memory audit log and rate limit state
//! - `presentation/` - HTTP handlers mounted under `/api/nsfw-check`
//!
//! ## Decision Model
//! - Structural failures (size, emptiness, format) are hard rejects with confidence 1.0
//! - Any classifier failure or panic during inspection is a reject, never an approval
//! - Every decision is recorded in the audit log, most recent 10,000 retained

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::NsfwConfig;
pub use domain::classifier::{ContentClassifier, StubClassifier};
pub use error::{NsfwError, NsfwResult};
pub use infra::memory::InMemoryNsfwRepository;
pub use presentation::router::{nsfw_router, nsfw_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
