//! Presentation Layer
//!
//! HTTP handlers and DTOs for the gate endpoints.

pub mod dto;
pub mod handlers;
pub mod router;
