//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`ClassificationParams`]: oracle batching and grouping policy
//! - [`ValidationParams`]: validation batch size, worker pool, timeouts

pub mod classification_params;
pub mod validation_params;

pub use classification_params::ClassificationParams;
pub use validation_params::ValidationParams;
