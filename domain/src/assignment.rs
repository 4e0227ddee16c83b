//! Group assignments and the resumable checkpoint
//!
//! An [`AssignmentStore`] maps each functional group to the taxa placed in
//! it, each taxon carrying the subtree copied from the hierarchy. Species
//! membership is recovered by walking those subtrees down to their leaves.

use crate::core::error::DomainError;
use crate::taxonomy::TaxonNode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Name of the group injected for non-living organic matter.
pub const DETRITUS_GROUP: &str = "Detritus";
/// Species code carried by the detritus leaf.
pub const DETRITUS_SPEC_CODE: &str = "DET";

const DETRITUS_DESCRIPTION: &str = "Non-living organic matter that serves as a food source and represents the end point of the food web";

/// `{group → {taxon → subtree}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AssignmentStore {
    groups: BTreeMap<String, BTreeMap<String, TaxonNode>>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient parse of an assignment file.
    ///
    /// Non-object groups and non-object taxon entries are skipped.
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        let map = value.as_object().ok_or_else(|| {
            DomainError::InvalidAssignments("expected a JSON object of groups".to_string())
        })?;

        let mut store = Self::new();
        for (group, members) in map {
            let Some(members) = members.as_object() else {
                warn!("Ignoring non-object group entry '{}'", group);
                continue;
            };
            let entry = store.groups.entry(group.clone()).or_default();
            for (taxon, subtree) in members {
                if subtree.is_object() {
                    let node = TaxonNode::from_value(subtree)
                        .map_err(DomainError::InvalidAssignments)?;
                    entry.insert(taxon.clone(), node);
                }
            }
        }
        Ok(store)
    }

    /// Place `taxon` (with its subtree) into `group`.
    pub fn assign(
        &mut self,
        group: impl Into<String>,
        taxon: impl Into<String>,
        subtree: TaxonNode,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(taxon.into(), subtree);
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, TaxonNode>> {
        self.groups.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, TaxonNode>)> {
        self.groups.iter().map(|(name, members)| (name.as_str(), members))
    }

    /// Every taxon placed directly into some group.
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.groups
            .values()
            .flat_map(|members| members.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Species (leaf name) → group.
    ///
    /// A species reachable from two groups keeps the later group in key
    /// order; the duplicate is logged.
    pub fn species_assignments(&self) -> BTreeMap<String, String> {
        let mut assignments = BTreeMap::new();
        for (group, members) in &self.groups {
            for (taxon, subtree) in members {
                for (species, _) in subtree.leaves(taxon) {
                    if let Some(previous) = assignments.insert(species.to_string(), group.clone())
                        && previous != *group
                    {
                        warn!(
                            "Species '{}' appears in both '{}' and '{}'",
                            species, previous, group
                        );
                    }
                }
            }
        }
        assignments
    }

    /// Group → set of member species.
    pub fn group_members(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.groups
            .iter()
            .map(|(group, members)| {
                let species = members
                    .iter()
                    .flat_map(|(taxon, subtree)| subtree.leaves(taxon))
                    .map(|(name, _)| name.to_string())
                    .collect();
                (group.clone(), species)
            })
            .collect()
    }

    /// Inject the `Detritus` group if absent. Returns `true` if added.
    pub fn ensure_detritus(&mut self) -> bool {
        if self.groups.contains_key(DETRITUS_GROUP) {
            return false;
        }
        let leaf = TaxonNode::leaf(DETRITUS_SPEC_CODE)
            .with_ecology(json!({ "description": DETRITUS_DESCRIPTION }));
        self.assign(DETRITUS_GROUP, DETRITUS_GROUP, leaf);
        true
    }
}

impl<'de> Deserialize<'de> for AssignmentStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Names of taxa the engine has resolved into a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedTaxaSet(BTreeSet<String>);

impl ProcessedTaxaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, taxon: impl Into<String>) -> bool {
        self.0.insert(taxon.into())
    }

    pub fn contains(&self, taxon: &str) -> bool {
        self.0.contains(taxon)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for ProcessedTaxaSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedTaxaSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Everything persisted between ranks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoint {
    pub assignments: AssignmentStore,
    /// Novel groups collected while force grouping is on.
    pub extra_groups: AssignmentStore,
    pub processed: ProcessedTaxaSet,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the processed set from the stores' keys plus `persisted`.
    pub fn restore(
        assignments: AssignmentStore,
        extra_groups: AssignmentStore,
        persisted: ProcessedTaxaSet,
    ) -> Self {
        let mut processed = persisted;
        processed.extend(assignments.taxa());
        processed.extend(extra_groups.taxa());
        Self {
            assignments,
            extra_groups,
            processed,
        }
    }

    pub fn is_processed(&self, taxon: &str) -> bool {
        self.processed.contains(taxon)
    }
}
