//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod output_format;
mod template_source;
pub mod validation;

pub use output_format::OutputFormat;
pub use template_source::TemplateSource;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
