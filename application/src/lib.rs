//! Application layer for ecogroup
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ClassificationParams, ValidationParams};
pub use ports::{
    checkpoint::{CheckpointError, CheckpointStore, InMemoryCheckpointStore},
    classifier::{Classifier, ClassifierError},
    composite_progress::CompositeProgress,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    iteration_reader::{IterationFiles, IterationReader, ReaderError},
    iteration_runner::{IterationRunner, RunnerError},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{ClassificationProgress, NoProgress, NoValidationProgress, ValidationProgress},
};
pub use use_cases::analyze_validation::{
    AnalyzeValidationError, AnalyzeValidationInput, AnalyzeValidationUseCase,
};
pub use use_cases::classify_species::{
    ClassificationSummary, ClassifySpeciesError, ClassifySpeciesInput, ClassifySpeciesOutput,
    ClassifySpeciesUseCase,
};
pub use use_cases::llm_classifier::LlmClassifier;
pub use use_cases::retrying_classifier::RetryingClassifier;
pub use use_cases::run_validation::{RunValidationError, RunValidationInput, RunValidationUseCase};
pub use use_cases::synthesize_template::{
    SynthesizeTemplateError, SynthesizeTemplateInput, SynthesizeTemplateUseCase,
    SynthesizedTemplate,
};
