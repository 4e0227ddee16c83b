//! Prompt domain
//!
//! Templates for the classification oracle and for synthesizing a grouping
//! template from a study area.

mod template;

pub use template::{ClassificationPrompt, TemplatePrompt};
