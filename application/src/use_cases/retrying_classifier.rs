//! Retry decorator for classifiers
//!
//! Transient failures (rate limits, overload, timeouts) are retried with
//! exponential backoff and jitter. Anything else fails immediately.

use crate::ports::classifier::{Classifier, ClassifierError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use async_trait::async_trait;
use ecogroup_domain::{ClassificationRequest, ClassificationResponse, RetryPolicy};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub struct RetryingClassifier<C: Classifier> {
    inner: C,
    policy: RetryPolicy,
    logger: Arc<dyn ConversationLogger>,
}

impl<C: Classifier> RetryingClassifier<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<C: Classifier> Classifier for RetryingClassifier<C> {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ClassifierError> {
        let mut attempt = 0;
        loop {
            match self.inner.classify(request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if !self.policy.should_retry(attempt) => {
                    return Err(ClassifierError::RetriesExhausted {
                        attempts: attempt + 1,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    let sample = rand::thread_rng().gen_range(-1.0..=1.0);
                    let delay = self.policy.delay_for(attempt, sample);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:.1}s",
                        attempt + 1,
                        self.policy.max_attempts,
                        e,
                        delay.as_secs_f64()
                    );
                    self.logger.log(ConversationEvent::new(
                        "oracle_retry",
                        json!({
                            "attempt": attempt + 1,
                            "max_attempts": self.policy.max_attempts,
                            "delay_secs": delay.as_secs_f64(),
                            "error": e.to_string(),
                            "taxa": request.taxa,
                        }),
                    ));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
