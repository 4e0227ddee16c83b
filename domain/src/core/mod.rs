//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: oracle models and their wire identifiers
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
