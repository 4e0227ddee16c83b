//! Classification oracle contract
//!
//! A [`ClassificationRequest`] asks the oracle to place a batch of sibling
//! taxa into functional groups. The answer maps each taxon to a group name
//! or to [`Verdict::Resolve`], meaning "too diverse, look at the children".

use crate::core::error::DomainError;
use crate::registry::ReferenceGroupRegistry;
use crate::taxonomy::Rank;
use crate::util::extract_json_object;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel verdict asking the engine to descend one rank.
pub const RESOLVE: &str = "RESOLVE";

/// Oracle answer for one taxon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Resolve,
    Group(String),
}

impl Verdict {
    /// Parse a raw verdict. Blank strings carry no verdict.
    pub fn parse(raw: &str) -> Option<Verdict> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed == RESOLVE {
            Some(Verdict::Resolve)
        } else {
            Some(Verdict::Group(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verdict::Resolve => RESOLVE,
            Verdict::Group(name) => name,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One batch of sibling taxa sent to the oracle.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub taxa: Vec<String>,
    pub rank: Rank,
    /// Snapshot of the registry at the start of the rank.
    pub available_groups: ReferenceGroupRegistry,
    /// Every taxon in the batch is a species leaf; `RESOLVE` is not an option.
    pub is_leaf_rank: bool,
    /// Free-text research focus forwarded to the oracle.
    pub domain_context: Option<String>,
}

impl ClassificationRequest {
    pub fn new(taxa: Vec<String>, rank: Rank, available_groups: ReferenceGroupRegistry) -> Self {
        Self {
            taxa,
            rank,
            available_groups,
            is_leaf_rank: false,
            domain_context: None,
        }
    }

    pub fn with_leaf_rank(mut self, is_leaf_rank: bool) -> Self {
        self.is_leaf_rank = is_leaf_rank;
        self
    }

    pub fn with_domain_context(mut self, context: Option<String>) -> Self {
        self.domain_context = context.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Oracle verdicts keyed by taxon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResponse {
    verdicts: BTreeMap<String, String>,
}

impl ClassificationResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(mut self, taxon: impl Into<String>, verdict: impl Into<String>) -> Self {
        self.verdicts.insert(taxon.into(), verdict.into());
        self
    }

    /// Parse the first JSON object found in an oracle reply.
    ///
    /// Non-string values are ignored. A reply without a JSON object is a
    /// [`DomainError::MalformedResponse`].
    pub fn parse(reply: &str) -> Result<Self, DomainError> {
        let object = extract_json_object(reply).ok_or_else(|| {
            DomainError::MalformedResponse(format!(
                "no JSON object in reply: {}",
                crate::util::truncate_str(reply, 200)
            ))
        })?;

        let verdicts = object
            .into_iter()
            .filter_map(|(taxon, value)| value.as_str().map(|v| (taxon, v.to_string())))
            .collect();
        Ok(Self { verdicts })
    }

    /// Parsed verdict for a taxon, `None` if missing or blank.
    pub fn verdict(&self, taxon: &str) -> Option<Verdict> {
        self.verdicts.get(taxon).and_then(|raw| Verdict::parse(raw))
    }

    /// Taxa the oracle answered for that were not asked about.
    pub fn unexpected_taxa<'a>(&'a self, asked: &[String]) -> Vec<&'a str> {
        self.verdicts
            .keys()
            .filter(|taxon| !asked.contains(taxon))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse(" RESOLVE "), Some(Verdict::Resolve));
        assert_eq!(
            Verdict::parse("Demersal fish "),
            Some(Verdict::Group("Demersal fish".to_string()))
        );
        assert_eq!(Verdict::parse("   "), None);
    }

    #[test]
    fn test_response_parse_with_prose() {
        let reply = r#"Here you go:
```json
{"Gadidae": "Demersal fish", "Cnidaria": "RESOLVE", "Odd": 3}
```"#;
        let response = ClassificationResponse::parse(reply).unwrap();
        assert_eq!(response.len(), 2);
        assert_eq!(response.verdict("Cnidaria"), Some(Verdict::Resolve));
        assert_eq!(response.verdict("Odd"), None);
    }

    #[test]
    fn test_response_without_json_is_malformed() {
        let err = ClassificationResponse::parse("I cannot help with that").unwrap_err();
        assert!(matches!(err, DomainError::MalformedResponse(_)));
    }

    #[test]
    fn test_unexpected_taxa() {
        let request = ClassificationRequest::new(
            vec!["A".to_string()],
            Rank::Family,
            ReferenceGroupRegistry::new(),
        );
        let response = ClassificationResponse::new()
            .with_verdict("A", "Fish")
            .with_verdict("Z", "Fish");
        assert_eq!(response.unexpected_taxa(&request.taxa), vec!["Z"]);
    }

    #[test]
    fn test_blank_domain_context_dropped() {
        let request =
            ClassificationRequest::new(vec![], Rank::Kingdom, ReferenceGroupRegistry::new())
                .with_domain_context(Some("  ".to_string()));
        assert!(request.domain_context.is_none());
    }
}
