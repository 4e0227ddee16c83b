//! LLM-backed classifier
//!
//! Renders the classification prompt, sends it through an [`LlmGateway`]
//! session and parses the first JSON object of the reply.

use crate::ports::classifier::{Classifier, ClassifierError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use async_trait::async_trait;
use ecogroup_domain::{
    ClassificationPrompt, ClassificationRequest, ClassificationResponse, Model,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct LlmClassifier<G: LlmGateway> {
    gateway: Arc<G>,
    model: Model,
    logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway> LlmClassifier<G> {
    pub fn new(gateway: Arc<G>, model: Model) -> Self {
        Self {
            gateway,
            model,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

#[async_trait]
impl<G: LlmGateway> Classifier for LlmClassifier<G> {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ClassifierError> {
        let prompt = ClassificationPrompt::user(request);
        debug!(
            "Asking {} about {} taxa at {}",
            self.model,
            request.taxa.len(),
            request.rank
        );

        self.logger.log(ConversationEvent::new(
            "oracle_request",
            json!({
                "model": self.model.to_string(),
                "rank": request.rank.as_str(),
                "taxa": request.taxa,
                "prompt": prompt,
            }),
        ));

        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, ClassificationPrompt::system())
            .await?;
        let reply = session.send(&prompt).await?;

        self.logger.log(ConversationEvent::new(
            "oracle_response",
            json!({
                "model": self.model.to_string(),
                "rank": request.rank.as_str(),
                "reply": reply,
            }),
        ));

        ClassificationResponse::parse(&reply).map_err(|e| {
            warn!("Unparseable reply for [{}]: {}", request.taxa.join(", "), e);
            self.logger.log(ConversationEvent::new(
                "oracle_parse_error",
                json!({
                    "taxa": request.taxa,
                    "error": e.to_string(),
                }),
            ));
            ClassifierError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, LlmSession};
    use ecogroup_domain::{Rank, ReferenceGroupRegistry, Verdict};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedSession {
        model: Model,
        replies: Arc<Mutex<VecDeque<Result<String, GatewayError>>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LlmSession for ScriptedSession {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn send(&self, content: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(content.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("no scripted reply".into())))
        }
    }

    struct ScriptedGateway {
        replies: Arc<Mutex<VecDeque<Result<String, GatewayError>>>>,
        prompts: Arc<Mutex<Vec<String>>>,
        system_prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                prompts: Arc::new(Mutex::new(Vec::new())),
                system_prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
            Ok(Box::new(ScriptedSession {
                model: model.clone(),
                replies: Arc::clone(&self.replies),
                prompts: Arc::clone(&self.prompts),
            }))
        }

        async fn create_session_with_system_prompt(
            &self,
            model: &Model,
            system_prompt: &str,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.system_prompts
                .lock()
                .unwrap()
                .push(system_prompt.to_string());
            self.create_session(model).await
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn request() -> ClassificationRequest {
        ClassificationRequest::new(
            vec!["Gadidae".into(), "Crangonidae".into()],
            Rank::Family,
            ReferenceGroupRegistry::from_pairs([("Demersal fish", "Bottom-living fish")]),
        )
    }

    #[tokio::test]
    async fn test_reply_with_prose_is_parsed() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(
            "Here you go:\n{\"Gadidae\": \"Demersal fish\", \"Crangonidae\": \"RESOLVE\"}".into(),
        )]));
        let logger = Arc::new(RecordingLogger::default());
        let classifier =
            LlmClassifier::new(Arc::clone(&gateway), Model::default()).with_logger(logger.clone());

        let response = classifier.classify(&request()).await.unwrap();

        assert_eq!(
            response.verdict("Gadidae"),
            Some(Verdict::Group("Demersal fish".into()))
        );
        assert_eq!(response.verdict("Crangonidae"), Some(Verdict::Resolve));
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["oracle_request", "oracle_response"]
        );

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].contains("Gadidae"));
        assert!(prompts[0].contains("Demersal fish"));
        assert_eq!(
            gateway.system_prompts.lock().unwrap()[0],
            ClassificationPrompt::system()
        );
    }

    #[tokio::test]
    async fn test_reply_without_json_is_malformed() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok("I am not sure.".into())]));
        let logger = Arc::new(RecordingLogger::default());
        let classifier = LlmClassifier::new(gateway, Model::default()).with_logger(logger.clone());

        let err = classifier.classify(&request()).await.unwrap_err();

        assert!(matches!(err, ClassifierError::MalformedResponse(_)));
        assert!(logger.events.lock().unwrap().contains(&"oracle_parse_error"));
    }

    #[tokio::test]
    async fn test_gateway_error_is_passed_through() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::RateLimited(
            "429".into(),
        ))]));
        let classifier = LlmClassifier::new(gateway, Model::Gemini);

        let err = classifier.classify(&request()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
