use crate::scene::SceneHandle;
use crate::style::ConfidenceTier;
use conceptree_core::{PrincipleCategory, TreeNode};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary figures for one analysed tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStats {
    pub root_term: String,
    pub node_count: usize,
    pub total_principles: usize,
    pub max_depth: u32,
    /// Mean over every principle in the tree; `0` when there are none.
    pub average_confidence: f32,
    /// Sum of per-node processing times.
    pub processing_time_ms: u64,
    pub nodes_per_depth: BTreeMap<u32, usize>,
    pub principles_per_category: BTreeMap<PrincipleCategory, usize>,
    pub nodes_per_tier: BTreeMap<ConfidenceTier, usize>,
}

impl TreeStats {
    /// Statistics over the whole input tree, including nodes a scene would skip as
    /// malformed.
    pub fn from_tree(tree: &TreeNode) -> Self {
        Self::accumulate(&tree.name, tree.pre_order())
    }

    /// Statistics over the nodes a scene actually placed.
    pub fn from_scene(scene: &SceneHandle) -> Self {
        let root_term = scene
            .nodes()
            .first()
            .map(|node| node.source.name.as_str())
            .unwrap_or_default();
        Self::accumulate(root_term, scene.nodes().iter().map(|node| &node.source))
    }

    fn accumulate<'a>(root_term: &str, nodes: impl Iterator<Item = &'a TreeNode>) -> Self {
        let mut stats = Self {
            root_term: root_term.to_string(),
            node_count: 0,
            total_principles: 0,
            max_depth: 0,
            average_confidence: 0.0,
            processing_time_ms: 0,
            nodes_per_depth: BTreeMap::new(),
            principles_per_category: BTreeMap::new(),
            nodes_per_tier: BTreeMap::new(),
        };

        let mut confidence_sum = 0.0f64;
        for node in nodes {
            stats.node_count += 1;
            stats.max_depth = stats.max_depth.max(node.depth);
            stats.processing_time_ms = stats
                .processing_time_ms
                .saturating_add(node.processing_time_ms);
            *stats.nodes_per_depth.entry(node.depth).or_default() += 1;
            *stats
                .nodes_per_tier
                .entry(ConfidenceTier::from_principles(&node.principles))
                .or_default() += 1;

            for principle in &node.principles {
                stats.total_principles += 1;
                confidence_sum += principle.confidence as f64;
                *stats
                    .principles_per_category
                    .entry(principle.category)
                    .or_default() += 1;
            }
        }

        if stats.total_principles > 0 {
            stats.average_confidence = (confidence_sum / stats.total_principles as f64) as f32;
        }
        stats
    }

    pub fn tier_count(&self, tier: ConfidenceTier) -> usize {
        self.nodes_per_tier.get(&tier).copied().unwrap_or(0)
    }
}
