//! Prompt templates for the classification oracle and template synthesis

use crate::classification::{ClassificationRequest, RESOLVE};
use crate::geo::{AreaDescription, BoundingBox};
use crate::registry::ReferenceGroupRegistry;

/// Prompts for classifying a batch of taxa.
pub struct ClassificationPrompt;

impl ClassificationPrompt {
    pub fn system() -> &'static str {
        r#"You are a marine ecologist building the functional groups of an Ecopath with Ecosim food-web model.
A functional group is a species or set of species filling the same ecological niche: similar growth and consumption rates, diet, habitat and predators.
Group by ecological role, not by taxonomic relatedness. Consider adult stages only."#
    }

    pub fn user(request: &ClassificationRequest) -> String {
        let mut prompt = String::new();

        if let Some(focus) = &request.domain_context {
            prompt.push_str(&format!(
                r#"Research focus: {}
Taxa related to this focus deserve finer groupings, and species of particular interest may form their own group.
Taxa interacting strongly with the focus should also keep a high resolution; other taxa may be grouped broadly.

"#,
                focus
            ));
        }

        prompt.push_str(&format!(
            "Assign each of the following taxa at the {} level to one functional group.\n\n",
            request.rank
        ));

        if request.is_leaf_rank {
            prompt.push_str(
                "These are individual species: choose the best fitting group for every one of them.\n",
            );
        } else {
            prompt.push_str(&format!(
                r#"If the members of a taxon differ in feeding strategy or trophic level (for example a phylum mixing filter feeders and predators), answer "{}" for it so its members are examined one rank lower.
Only give a group when you are confident every member of the taxon belongs to it.
"#,
                RESOLVE
            ));
        }

        prompt.push_str("\nTaxa:\n");
        for taxon in &request.taxa {
            prompt.push_str(&format!("- {}\n", taxon));
        }

        prompt.push_str("\nAvailable functional groups (name: description):\n");
        prompt.push_str(&group_listing(&request.available_groups));

        prompt.push_str(&format!(
            r#"
You may propose a new group name when none of the available groups fits.
Reply with a single JSON object mapping every taxon to its group, e.g.
{{"Taxon1": "Group1", "Taxon2": "{}"}}"#,
            RESOLVE
        ));

        prompt
    }
}

/// Prompts for synthesizing a grouping template from a study area.
pub struct TemplatePrompt;

impl TemplatePrompt {
    pub fn area_description(bbox: &BoundingBox) -> String {
        format!(
            r#"A marine study area spans latitude {:.4}° to {:.4}° and longitude {:.4}° to {:.4}°.

Describe it in exactly three lines:
REGION: <the marine regions covered>
ECOSYSTEM_TYPE: <the main ecosystem types present>
DESCRIPTION: <a short summary of its key ecological characteristics>

Do not add any other text."#,
            bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon
        )
    }

    pub fn group_proposal(
        area: &AreaDescription,
        reference: &ReferenceGroupRegistry,
        research_focus: Option<&str>,
        group_count: usize,
    ) -> String {
        let mut prompt = format!(
            r#"Study area
Region: {}
Ecosystem type: {}
Description: {}

"#,
            area.region, area.ecosystem_type, area.description
        );

        if !reference.is_empty() {
            prompt.push_str("Reference functional groups to adapt:\n");
            prompt.push_str(&group_listing(reference));
            prompt.push('\n');
        }
        if let Some(focus) = research_focus {
            prompt.push_str(&format!("Research focus: {}\n\n", focus));
        }

        prompt.push_str(&format!(
            r#"Propose about {} functional groups for an Ecopath with Ecosim model of this area.
Keep reference groups that occur here, add local groups the reference lacks, give species of research interest their own group,
and cover every trophic level and habitat. Describe each group's role in this ecosystem.

Reply with a JSON array in this form:
[{{"Group1": "Description1"}}, {{"Group2": "Description2"}}]"#,
            group_count
        ));
        prompt
    }

    pub fn synthesis(proposals: &[serde_json::Value], research_focus: Option<&str>) -> String {
        let rendered =
            serde_json::to_string_pretty(proposals).unwrap_or_else(|_| "[]".to_string());
        format!(
            r#"Here are {} independent functional group proposals for the same marine ecosystem:

{}

Merge them into one consensus grouping. Keep groups that recur across proposals, reconcile conflicting definitions,
cover all trophic levels and habitats, and keep the resolution appropriate for the research focus ({}).

Reply with a JSON array in the same form as the proposals."#,
            proposals.len(),
            rendered,
            research_focus.unwrap_or("none")
        )
    }
}

fn group_listing(groups: &ReferenceGroupRegistry) -> String {
    groups
        .iter()
        .map(|(name, description)| format!("{}: {}\n", name, description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Rank;

    fn request() -> ClassificationRequest {
        ClassificationRequest::new(
            vec!["Gadidae".to_string(), "Cnidaria".to_string()],
            Rank::Family,
            ReferenceGroupRegistry::from_pairs([("Demersal fish", "Bottom-feeding fish")]),
        )
    }

    #[test]
    fn test_user_prompt_lists_taxa_and_groups() {
        let prompt = ClassificationPrompt::user(&request());
        assert!(prompt.contains("at the Family level"));
        assert!(prompt.contains("- Gadidae\n"));
        assert!(prompt.contains("Demersal fish: Bottom-feeding fish"));
        assert!(prompt.contains(RESOLVE));
        assert!(!prompt.contains("Research focus"));
    }

    #[test]
    fn test_leaf_rank_drops_resolve_instructions() {
        let prompt = ClassificationPrompt::user(&request().with_leaf_rank(true));
        assert!(prompt.contains("individual species"));
        assert!(!prompt.contains("one rank lower"));
    }

    #[test]
    fn test_research_focus_included() {
        let prompt = ClassificationPrompt::user(
            &request().with_domain_context(Some("Atlantic cod recovery".to_string())),
        );
        assert!(prompt.starts_with("Research focus: Atlantic cod recovery"));
    }

    #[test]
    fn test_area_prompt_coordinates() {
        let bbox = BoundingBox {
            min_lon: -4.5,
            max_lon: 9.0,
            min_lat: 51.0,
            max_lat: 61.0,
        };
        let prompt = TemplatePrompt::area_description(&bbox);
        assert!(prompt.contains("51.0000° to 61.0000°"));
        assert!(prompt.contains("ECOSYSTEM_TYPE:"));
    }
}
