//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Rate limiting infrastructure (fixed window, in-memory store)
//! - Client identification from request headers

pub mod client;
pub mod rate_limit;
