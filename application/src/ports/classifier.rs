//! Classification oracle port
//!
//! The engine only sees a [`Classifier`]; whether verdicts come from an LLM,
//! a lookup table or a test stub is an adapter concern.

use super::llm_gateway::GatewayError;
use async_trait::async_trait;
use ecogroup_domain::{ClassificationRequest, ClassificationResponse, DomainError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl ClassifierError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClassifierError::Gateway(e) => e.is_transient(),
            ClassifierError::MalformedResponse(_) | ClassifierError::RetriesExhausted { .. } => {
                false
            }
        }
    }
}

impl From<DomainError> for ClassifierError {
    fn from(err: DomainError) -> Self {
        ClassifierError::MalformedResponse(err.to_string())
    }
}

/// Places a batch of sibling taxa into functional groups.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ClassifierError>;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ClassifierError> {
        (**self).classify(request).await
    }
}
