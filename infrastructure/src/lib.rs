//! Infrastructure layer for ecogroup
//!
//! Adapters for the ports defined in the application layer: the HTTP
//! oracle gateway, the JSON checkpoint store, worker processes for
//! validation batches, transcripts and configuration loading.

pub mod config;
pub mod layout;
pub mod loaders;
pub mod logging;
pub mod oracle;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAnalysisConfig, FileClassificationConfig, FileConfig, FileOracleConfig,
    FileOutputConfig, FileRetryConfig, FileValidationConfig, RunSettings,
};
pub use layout::RunLayout;
pub use loaders::{LoadError, TemplateLoader, load_hierarchy, load_template};
pub use logging::{GroupingReportWriter, JsonlConversationLogger};
pub use oracle::{HttpGatewayConfig, HttpLlmGateway, OracleError};
pub use storage::{JsonCheckpointStore, read_json, write_json};
pub use validation::{FsIterationReader, ProcessIterationRunner, write_metadata};
