//! Taxonomic hierarchy builder
//!
//! Turns flat species records into the nested [`TaxonNode`] tree keyed
//! Kingdom → Phylum → … → Species.
//!
//! Blank taxonomy fields (empty strings, `"nan"`, `"None"`, `null`) are
//! skipped, so a record missing its Family hangs its Genus directly below
//! its Order. When two records share an identical full path the later one
//! overwrites the leaf payload (last write wins); every overwrite is logged
//! and counted in [`Hierarchy::collisions`].

use super::node::{TaxonNode, UNKNOWN_SPEC_CODE, spec_code_to_string};
use super::rank::Rank;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Whether a raw taxonomy value should be treated as absent.
pub fn is_blank_taxon(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || ["nan", "none", "null", "na", "n/a"]
            .iter()
            .any(|blank| trimmed.eq_ignore_ascii_case(blank))
}

/// One species as harvested by the upstream data download step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesRecord {
    /// Record key (usually the binomial name).
    pub name: String,
    /// Non-blank taxonomy fields by rank.
    pub taxonomy: BTreeMap<Rank, String>,
    pub spec_code: Option<String>,
    pub ecology: Option<Value>,
    pub diet: Option<Value>,
}

impl SpeciesRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rank(mut self, rank: Rank, value: impl Into<String>) -> Self {
        let value = value.into();
        if !is_blank_taxon(&value) {
            self.taxonomy.insert(rank, value.trim().to_string());
        }
        self
    }

    pub fn with_spec_code(mut self, spec_code: impl Into<String>) -> Self {
        self.spec_code = Some(spec_code.into());
        self
    }

    pub fn with_ecology(mut self, ecology: Value) -> Self {
        self.ecology = Some(ecology);
        self
    }

    /// Parse one entry of the species data file.
    ///
    /// Expected shape: `{"taxonomy": {...}, "ecology": {...}, "diet": {...}}`.
    /// `Species` defaults to the record key when the taxonomy lacks it.
    pub fn from_json(name: &str, value: &Value) -> Self {
        let mut record = SpeciesRecord::new(name);
        let taxonomy = value.get("taxonomy");

        for rank in Rank::ALL {
            let raw = taxonomy
                .and_then(|t| t.get(rank.as_str()))
                .and_then(Value::as_str);
            if let Some(raw) = raw {
                record = record.with_rank(rank, raw);
            }
        }
        if !record.taxonomy.contains_key(&Rank::Species) {
            record = record.with_rank(Rank::Species, name);
        }

        record.spec_code = find_spec_code(value);
        record.ecology = non_empty(value.get("ecology"));
        record.diet = non_empty(value.get("diet"));
        record
    }

    /// Ordered path of taxon names from kingdom to species.
    pub fn path(&self) -> Vec<&str> {
        self.taxonomy.values().map(String::as_str).collect()
    }
}

/// Look up a species code: taxonomy first, then the record, then any
/// ecology source block.
fn find_spec_code(value: &Value) -> Option<String> {
    let direct = value
        .get("taxonomy")
        .and_then(|t| t.get("SpecCode"))
        .or_else(|| value.get("SpecCode"))
        .or_else(|| value.get("specCode"))
        .filter(|v| !v.is_null());
    if let Some(code) = direct {
        return Some(spec_code_to_string(code));
    }

    value
        .get("ecology")
        .and_then(Value::as_object)?
        .values()
        .filter_map(|source| source.get("specCode"))
        .find(|v| !v.is_null())
        .map(spec_code_to_string)
}

fn non_empty(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(v) => Some(v.clone()),
    }
}

/// Result of building the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    pub root: TaxonNode,
    /// Records placed in the tree.
    pub species_count: usize,
    /// Records dropped because every taxonomy field was blank.
    pub skipped: usize,
    /// Records whose leaf overwrote an earlier record's payload.
    pub collisions: usize,
}

/// Incremental builder for the taxonomic tree.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    hierarchy: Hierarchy,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one record. Returns `false` if it had no usable taxonomy.
    pub fn add(&mut self, record: SpeciesRecord) -> bool {
        if record.taxonomy.is_empty() {
            debug!("Skipping '{}': no taxonomy fields", record.name);
            self.hierarchy.skipped += 1;
            return false;
        }

        let mut current = &mut self.hierarchy.root;
        for taxon in record.taxonomy.values() {
            current = current.child_entry(taxon);
        }

        let spec_code = record
            .spec_code
            .unwrap_or_else(|| UNKNOWN_SPEC_CODE.to_string());
        if current.set_leaf_payload(spec_code, record.ecology, record.diet) {
            warn!(
                "Duplicate taxonomy path for '{}'; keeping the later record",
                record.name
            );
            self.hierarchy.collisions += 1;
        }
        self.hierarchy.species_count += 1;
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = SpeciesRecord>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn build(self) -> Hierarchy {
        self.hierarchy
    }
}

/// Build the hierarchy from a species data object (`{name: record}`).
pub fn build_hierarchy(species_data: &serde_json::Map<String, Value>) -> Hierarchy {
    let mut builder = HierarchyBuilder::new();
    builder.extend(
        species_data
            .iter()
            .map(|(name, value)| SpeciesRecord::from_json(name, value)),
    );
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_taxon_values() {
        assert!(is_blank_taxon(""));
        assert!(is_blank_taxon("  "));
        assert!(is_blank_taxon("nan"));
        assert!(is_blank_taxon("NaN"));
        assert!(is_blank_taxon("None"));
        assert!(!is_blank_taxon("Gadus"));
    }

    #[test]
    fn test_record_from_json_skips_blank_fields() {
        let value = json!({
            "taxonomy": {
                "Kingdom": "Animalia",
                "Phylum": "Chordata",
                "Class": "nan",
                "Order": null,
                "Family": "Gadidae",
                "Genus": "Gadus"
            },
            "ecology": {"SeaLifeBase": {}, "FishBase": {"specCode": 69}},
        });
        let record = SpeciesRecord::from_json("Gadus morhua", &value);
        assert_eq!(
            record.path(),
            vec!["Animalia", "Chordata", "Gadidae", "Gadus", "Gadus morhua"]
        );
        assert_eq!(record.spec_code.as_deref(), Some("69"));
        assert!(record.ecology.is_some());
        assert!(record.diet.is_none());
    }

    #[test]
    fn test_spec_code_prefers_taxonomy() {
        let value = json!({
            "taxonomy": {"Genus": "Gadus", "SpecCode": "1"},
            "SpecCode": "2",
        });
        let record = SpeciesRecord::from_json("Gadus morhua", &value);
        assert_eq!(record.spec_code.as_deref(), Some("1"));
    }

    #[test]
    fn test_builder_one_path_per_record() {
        let data = json!({
            "Gadus morhua": {"taxonomy": {"Kingdom": "Animalia", "Family": "Gadidae"}},
            "Melanogrammus aeglefinus": {"taxonomy": {"Kingdom": "Animalia", "Family": "Gadidae"}},
            "Zostera marina": {"taxonomy": {"Kingdom": "Plantae"}},
        });
        let hierarchy = build_hierarchy(data.as_object().unwrap());

        assert_eq!(hierarchy.species_count, 3);
        assert_eq!(hierarchy.root.leaf_count(), 3);
        let cod = hierarchy
            .root
            .node_at(&["Animalia", "Gadidae", "Gadus morhua"])
            .unwrap();
        assert_eq!(cod.spec_code(), Some(UNKNOWN_SPEC_CODE));
    }

    #[test]
    fn test_duplicate_path_last_write_wins() {
        let mut builder = HierarchyBuilder::new();
        builder.add(
            SpeciesRecord::new("a")
                .with_rank(Rank::Genus, "Gadus")
                .with_rank(Rank::Species, "Gadus morhua")
                .with_spec_code("1"),
        );
        builder.add(
            SpeciesRecord::new("b")
                .with_rank(Rank::Genus, "Gadus")
                .with_rank(Rank::Species, "Gadus morhua")
                .with_spec_code("2"),
        );
        let hierarchy = builder.build();
        assert_eq!(hierarchy.collisions, 1);
        assert_eq!(
            hierarchy
                .root
                .node_at(&["Gadus", "Gadus morhua"])
                .unwrap()
                .spec_code(),
            Some("2")
        );
    }

    #[test]
    fn test_record_without_taxonomy_is_skipped() {
        let mut builder = HierarchyBuilder::new();
        assert!(!builder.add(SpeciesRecord::new("   ")));
        let hierarchy = builder.build();
        assert_eq!(hierarchy.skipped, 1);
        assert_eq!(hierarchy.species_count, 0);
    }
}
