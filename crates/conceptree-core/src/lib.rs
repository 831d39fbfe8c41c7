use serde::{Deserialize, Serialize};
use std::fmt;

pub mod analysis;
pub mod category;
pub mod error;
pub mod tree;

pub use analysis::{AnalysisResult, ApiEnvelope, parse_tree_document};
pub use category::PrincipleCategory;
pub use error::{DocumentError, NodeDefect};
pub use tree::{PreOrder, TreeNode};

/// Position of a node in the pre-order walk of the tree it came from.
///
/// Stable for a fixed input tree, so it doubles as the node's identity inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An engineering principle discovered for a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: PrincipleCategory,
    /// Analyzer confidence in `[0, 1]`.
    pub confidence: f32,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub related_terms: Vec<String>,
}

impl Principle {
    pub fn new(id: impl Into<String>, category: PrincipleCategory, confidence: f32) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            description: String::new(),
            category,
            confidence,
            source_url: String::new(),
            related_terms: Vec::new(),
        }
    }
}

/// Mean confidence over a principle list, `0.0` when the list is empty.
pub fn average_confidence(principles: &[Principle]) -> f32 {
    if principles.is_empty() {
        return 0.0;
    }
    let sum: f32 = principles.iter().map(|p| p.confidence).sum();
    sum / principles.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_confidence_empty_is_zero() {
        assert_eq!(average_confidence(&[]), 0.0);
    }

    #[test]
    fn test_average_confidence_mean() {
        let principles = vec![
            Principle::new("a", PrincipleCategory::Structural, 0.5),
            Principle::new("b", PrincipleCategory::Thermal, 1.0),
        ];
        assert!((average_confidence(&principles) - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_principle_deserializes_service_shape() {
        let json = r#"{
            "id": "p1",
            "title": "Beam deflection",
            "description": "Beams bend under load.",
            "category": "Structural",
            "confidence": 0.82,
            "source_url": "https://en.wikipedia.org/wiki/Beam",
            "related_terms": ["moment", "stress"]
        }"#;
        let principle: Principle = serde_json::from_str(json).unwrap();
        assert_eq!(principle.category, PrincipleCategory::Structural);
        assert_eq!(principle.related_terms, vec!["moment", "stress"]);
    }
}
