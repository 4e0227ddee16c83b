//! Taxon tree node
//!
//! A [`TaxonNode`] is one taxon in the nested hierarchy. The JSON shape is
//! the one used by every assignment file:
//!
//! ```text
//! {
//!   "Chordata": {
//!     "Actinopterygii": {
//!       "Gadus morhua": { "specCode": "69", "ecology": { ... } }
//!     }
//!   }
//! }
//! ```
//!
//! Child taxa and the payload markers (`specCode`, `ecology`, `diet`) share
//! one JSON object, so (de)serialization is written by hand.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key carrying the species identifier on a leaf.
pub const SPEC_CODE_KEY: &str = "specCode";
/// Key carrying the ecology payload on a leaf.
pub const ECOLOGY_KEY: &str = "ecology";
/// Key carrying the diet payload on a leaf.
pub const DIET_KEY: &str = "diet";
/// Placeholder identifier when a record has no species code.
pub const UNKNOWN_SPEC_CODE: &str = "Unknown";

/// Whether a key is a payload marker rather than a child taxon.
pub fn is_marker_key(key: &str) -> bool {
    matches!(key, SPEC_CODE_KEY | ECOLOGY_KEY | DIET_KEY)
}

/// A node in the taxonomic hierarchy.
///
/// A node is a leaf iff it carries a `specCode`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonNode {
    children: BTreeMap<String, TaxonNode>,
    spec_code: Option<String>,
    ecology: Option<Value>,
    diet: Option<Value>,
}

impl TaxonNode {
    /// Create an empty internal node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a leaf with the given species code.
    pub fn leaf(spec_code: impl Into<String>) -> Self {
        Self {
            spec_code: Some(spec_code.into()),
            ..Self::default()
        }
    }

    pub fn with_ecology(mut self, ecology: Value) -> Self {
        self.ecology = Some(ecology);
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, child: TaxonNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.spec_code.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn spec_code(&self) -> Option<&str> {
        self.spec_code.as_deref()
    }

    pub fn ecology(&self) -> Option<&Value> {
        self.ecology.as_ref()
    }

    pub fn diet(&self) -> Option<&Value> {
        self.diet.as_ref()
    }

    pub fn children(&self) -> &BTreeMap<String, TaxonNode> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&TaxonNode> {
        self.children.get(name)
    }

    /// Get or create the named child.
    pub fn child_entry(&mut self, name: &str) -> &mut TaxonNode {
        self.children.entry(name.to_string()).or_default()
    }

    /// Names of the direct child taxa.
    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Replace the leaf payload. Returns `true` if a previous payload was
    /// overwritten.
    pub fn set_leaf_payload(
        &mut self,
        spec_code: String,
        ecology: Option<Value>,
        diet: Option<Value>,
    ) -> bool {
        let overwritten = self.spec_code.is_some();
        self.spec_code = Some(spec_code);
        self.ecology = ecology;
        self.diet = diet;
        overwritten
    }

    /// Follow a path of child names from this node.
    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&TaxonNode> {
        let mut current = self;
        for name in path {
            current = current.children.get(name.as_ref())?;
        }
        Some(current)
    }

    /// Collect every leaf below (and including) this node as `(name, node)`.
    ///
    /// `name` is the key of the leaf under its parent; `self_name` is used
    /// when this node is itself a leaf.
    pub fn leaves<'a>(&'a self, self_name: &'a str) -> Vec<(&'a str, &'a TaxonNode)> {
        let mut leaves = Vec::new();
        let mut stack = vec![(self_name, self)];
        while let Some((name, node)) = stack.pop() {
            if node.is_leaf() {
                leaves.push((name, node));
            }
            for (child_name, child) in &node.children {
                stack.push((child_name.as_str(), child));
            }
        }
        leaves
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                count += 1;
            }
            stack.extend(node.children.values());
        }
        count
    }

    /// Build a node from a JSON object.
    ///
    /// Non-object values under non-marker keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let map = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object for a taxon, found {}", value))?;

        let mut node = TaxonNode::new();
        for (key, entry) in map {
            match key.as_str() {
                SPEC_CODE_KEY => node.spec_code = Some(spec_code_to_string(entry)),
                ECOLOGY_KEY => node.ecology = Some(entry.clone()),
                DIET_KEY => node.diet = Some(entry.clone()),
                _ if entry.is_object() => {
                    node.children.insert(key.clone(), TaxonNode::from_value(entry)?);
                }
                _ => {}
            }
        }
        Ok(node)
    }
}

/// Render a species code value as a string.
///
/// Species databases hand out numeric codes; assignment files written by
/// other tools may hold them as numbers or strings.
pub fn spec_code_to_string(value: &Value) -> String {
    match value {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        _ => UNKNOWN_SPEC_CODE.to_string(),
    }
}

impl Serialize for TaxonNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.children.len()
            + usize::from(self.spec_code.is_some())
            + usize::from(self.ecology.is_some())
            + usize::from(self.diet.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        if let Some(code) = &self.spec_code {
            map.serialize_entry(SPEC_CODE_KEY, code)?;
        }
        if let Some(ecology) = &self.ecology {
            map.serialize_entry(ECOLOGY_KEY, ecology)?;
        }
        if let Some(diet) = &self.diet {
            map.serialize_entry(DIET_KEY, diet)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaxonNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        TaxonNode::from_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TaxonNode {
        TaxonNode::new().with_child(
            "Gadidae",
            TaxonNode::new()
                .with_child("Gadus morhua", TaxonNode::leaf("69"))
                .with_child(
                    "Melanogrammus aeglefinus",
                    TaxonNode::leaf("28").with_ecology(json!({"depth": 80})),
                ),
        )
    }

    #[test]
    fn test_leaf_detection() {
        let tree = sample();
        assert!(!tree.is_leaf());
        let cod = tree.node_at(&["Gadidae", "Gadus morhua"]).unwrap();
        assert!(cod.is_leaf());
        assert_eq!(cod.spec_code(), Some("69"));
    }

    #[test]
    fn test_leaves_and_count() {
        let tree = sample();
        let mut names: Vec<&str> = tree.leaves("root").into_iter().map(|(n, _)| n).collect();
        names.sort();
        assert_eq!(names, vec!["Gadus morhua", "Melanogrammus aeglefinus"]);
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["Gadidae"]["Gadus morhua"]["specCode"], "69");
        assert_eq!(
            value["Gadidae"]["Melanogrammus aeglefinus"]["ecology"]["depth"],
            80
        );
    }

    #[test]
    fn test_deserialize_numeric_spec_code() {
        let node: TaxonNode =
            serde_json::from_value(json!({"Sprattus sprattus": {"specCode": 1350}})).unwrap();
        assert_eq!(
            node.child("Sprattus sprattus").unwrap().spec_code(),
            Some("1350")
        );
    }

    #[test]
    fn test_deserialize_ignores_scalar_children() {
        let node: TaxonNode =
            serde_json::from_value(json!({"note": "free text", "A": {"specCode": "1"}})).unwrap();
        assert_eq!(node.taxa().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_marker_keys() {
        assert!(is_marker_key("specCode"));
        assert!(is_marker_key("ecology"));
        assert!(is_marker_key("diet"));
        assert!(!is_marker_key("Chordata"));
    }

    #[test]
    fn test_set_leaf_payload_reports_overwrite() {
        let mut node = TaxonNode::new();
        assert!(!node.set_leaf_payload("1".into(), None, None));
        assert!(node.set_leaf_payload("2".into(), None, None));
        assert_eq!(node.spec_code(), Some("2"));
    }
}
