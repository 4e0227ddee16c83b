//! Synthesize template use case
//!
//! Builds a reference group template for a study area given as GeoJSON:
//! the oracle describes the area, several independent group proposals are
//! gathered in parallel, and a final call merges them into one template.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use ecogroup_domain::{
    AreaDescription, BoundingBox, DomainError, Model, ReferenceGroupRegistry, TemplatePrompt,
    util::extract_json_array,
};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a marine ecologist designing functional groups for Ecopath with Ecosim models.";

#[derive(Error, Debug)]
pub enum SynthesizeTemplateError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("All {0} group proposals failed")]
    NoProposals(usize),

    #[error("Synthesis reply holds no group template")]
    NoTemplate,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the SynthesizeTemplate use case
#[derive(Debug, Clone)]
pub struct SynthesizeTemplateInput {
    pub bbox: BoundingBox,
    /// Groups the proposals should adapt; may be empty.
    pub reference: ReferenceGroupRegistry,
    pub research_focus: Option<String>,
    pub proposals: usize,
    /// Approximate number of groups asked for per proposal.
    pub group_count: usize,
}

impl SynthesizeTemplateInput {
    pub fn new(bbox: BoundingBox, reference: ReferenceGroupRegistry) -> Self {
        Self {
            bbox,
            reference,
            research_focus: None,
            proposals: 3,
            group_count: 30,
        }
    }

    pub fn with_research_focus(mut self, focus: Option<String>) -> Self {
        self.research_focus = focus.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn with_proposals(mut self, proposals: usize) -> Self {
        self.proposals = proposals.max(1);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SynthesizedTemplate {
    pub area: AreaDescription,
    /// Parsed proposals that went into the synthesis.
    pub proposals: Vec<Value>,
    pub registry: ReferenceGroupRegistry,
}

pub struct SynthesizeTemplateUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    model: Model,
    logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway + 'static> SynthesizeTemplateUseCase<G> {
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

    pub async fn execute(
        &self,
        input: SynthesizeTemplateInput,
    ) -> Result<SynthesizedTemplate, SynthesizeTemplateError> {
        let reply = self
            .ask(&TemplatePrompt::area_description(&input.bbox), "area_description")
            .await?;
        let area = AreaDescription::parse(&reply);
        info!("Study area: {} ({})", area.region, area.ecosystem_type);

        let prompt = TemplatePrompt::group_proposal(
            &area,
            &input.reference,
            input.research_focus.as_deref(),
            input.group_count,
        );
        let proposals = self.gather_proposals(prompt, input.proposals).await?;

        let reply = self
            .ask(
                &TemplatePrompt::synthesis(&proposals, input.research_focus.as_deref()),
                "template_synthesis",
            )
            .await?;
        let groups = extract_json_array(&reply).ok_or(SynthesizeTemplateError::NoTemplate)?;
        let registry = ReferenceGroupRegistry::from_template_value(&Value::Array(groups))?;
        if registry.is_empty() {
            return Err(SynthesizeTemplateError::NoTemplate);
        }

        info!(
            "Synthesized {} groups from {} proposals",
            registry.len(),
            proposals.len()
        );
        Ok(SynthesizedTemplate {
            area,
            proposals,
            registry,
        })
    }

    /// Ask for `count` independent proposals in parallel. Failed or
    /// unparseable proposals are dropped.
    async fn gather_proposals(
        &self,
        prompt: String,
        count: usize,
    ) -> Result<Vec<Value>, SynthesizeTemplateError> {
        let mut join_set = JoinSet::new();
        for index in 0..count {
            let gateway = Arc::clone(&self.gateway);
            let model = self.model.clone();
            let prompt = prompt.clone();
            join_set.spawn(async move {
                let result = async {
                    let session = gateway
                        .create_session_with_system_prompt(&model, SYSTEM_PROMPT)
                        .await?;
                    session.send(&prompt).await
                }
                .await;
                (index, result)
            });
        }

        let mut proposals: Vec<(usize, Value)> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(reply))) => {
                    self.log("group_proposal", &reply);
                    match extract_json_array(&reply) {
                        Some(groups) => proposals.push((index, Value::Array(groups))),
                        None => warn!("Proposal {} holds no JSON array", index + 1),
                    }
                }
                Ok((index, Err(e))) => warn!("Proposal {} failed: {}", index + 1, e),
                Err(e) => warn!("Proposal task failed: {}", e),
            }
        }

        if proposals.is_empty() {
            return Err(SynthesizeTemplateError::NoProposals(count));
        }
        proposals.sort_by_key(|(index, _)| *index);
        debug!("{} of {} proposals usable", proposals.len(), count);
        Ok(proposals.into_iter().map(|(_, p)| p).collect())
    }

    async fn ask(&self, prompt: &str, event: &'static str) -> Result<String, GatewayError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, SYSTEM_PROMPT)
            .await?;
        let reply = session.send(prompt).await?;
        self.log(event, &reply);
        Ok(reply)
    }

    fn log(&self, event: &'static str, reply: &str) {
        self.logger.log(ConversationEvent::new(
            event,
            json!({
                "model": self.model.to_string(),
                "reply": reply,
            }),
        ));
    }
}
