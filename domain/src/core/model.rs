//! Model value object representing the LLM behind the classification oracle

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Oracle models (Value Object)
///
/// Short aliases are what users put in configuration and `ai_config.json`;
/// [`Model::api_id`] is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Model {
    #[default]
    Claude,
    AwsClaude,
    Gemini,
    Gemma2,
    Llama3,
    Mixtral,
    Custom(String),
}

impl Model {
    /// Short alias for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Claude => "claude",
            Model::AwsClaude => "aws_claude",
            Model::Gemini => "gemini",
            Model::Gemma2 => "gemma2",
            Model::Llama3 => "llama3",
            Model::Mixtral => "mixtral",
            Model::Custom(s) => s,
        }
    }

    /// Identifier sent to the chat completions endpoint
    pub fn api_id(&self) -> &str {
        match self {
            Model::Claude => "claude-3-5-sonnet-20241022",
            Model::AwsClaude => "anthropic.claude-3-5-sonnet-20240620-v1:0",
            Model::Gemini => "gemini-1.5-flash",
            Model::Gemma2 => "gemma2-9b-it",
            Model::Llama3 => "llama-3.3-70b-versatile",
            Model::Mixtral => "mixtral-8x7b-32768",
            Model::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let known = [
            Model::Claude,
            Model::AwsClaude,
            Model::Gemini,
            Model::Gemma2,
            Model::Llama3,
            Model::Mixtral,
        ];
        let s = s.trim();
        Ok(known
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s) || m.api_id() == s)
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
