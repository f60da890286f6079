//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (DetectionResult, AuditLogEntry, AuditStats)
//! - Domain services (format sniffing, header dimension reading)
//! - The content classifier seam
//! - Repository traits (interfaces)

pub mod classifier;
pub mod entities;
pub mod repository;
pub mod services;
