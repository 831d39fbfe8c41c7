//! Depth grouping
//!
//! Flattens a [`TreeNode`] hierarchy into per-depth lists in pre-order. All
//! nodes of one depth share a ring, so the grouping deliberately ignores which
//! parent a node hangs under.

use conceptree_core::{NodeDefect, NodeIndex, TreeNode};
use std::collections::BTreeMap;
use tracing::warn;

const SCENE_TARGET: &str = "conceptree::graph::scene";

/// A node accepted into the layout.
#[derive(Debug, Clone, Copy)]
pub struct GroupedNode<'a> {
    pub index: NodeIndex,
    pub parent: Option<NodeIndex>,
    pub depth: u32,
    pub node: &'a TreeNode,
}

/// A node left out of the layout together with everything beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    pub name: String,
    /// Depth the node should have had given its position in the tree.
    pub depth: u32,
    pub defect: NodeDefect,
    /// Number of nodes dropped, including this one.
    pub subtree_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DepthGroups<'a> {
    groups: BTreeMap<u32, Vec<GroupedNode<'a>>>,
    skipped: Vec<SkippedNode>,
    node_count: usize,
}

impl<'a> DepthGroups<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group `root` and its descendants by depth.
    ///
    /// Node indices follow the pre-order walk over accepted nodes. A node with no
    /// name, or whose depth does not follow its parent, is skipped with its subtree.
    pub fn from_tree(root: &'a TreeNode) -> Self {
        let mut groups = Self::empty();
        let mut stack: Vec<(&'a TreeNode, Option<NodeIndex>, u32)> = vec![(root, None, 0)];

        while let Some((node, parent, expected_depth)) = stack.pop() {
            if let Err(defect) = node.check(expected_depth) {
                let subtree_size = node.node_count();
                warn!(
                    target: SCENE_TARGET,
                    name = %node.name,
                    depth = expected_depth,
                    subtree_size,
                    "Skipping malformed node: {defect}"
                );
                groups.skipped.push(SkippedNode {
                    name: node.name.clone(),
                    depth: expected_depth,
                    defect,
                    subtree_size,
                });
                continue;
            }

            let index = NodeIndex(groups.node_count);
            groups.node_count += 1;
            groups.groups.entry(expected_depth).or_default().push(GroupedNode {
                index,
                parent,
                depth: expected_depth,
                node,
            });

            for child in node.children().iter().rev() {
                stack.push((child, Some(index), expected_depth + 1));
            }
        }

        groups
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Nodes at `depth` in pre-order; empty for depths with no nodes.
    pub fn depth(&self, depth: u32) -> &[GroupedNode<'a>] {
        self.groups.get(&depth).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(depth, nodes)` pairs, shallowest first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[GroupedNode<'a>])> {
        self.groups.iter().map(|(d, nodes)| (*d, nodes.as_slice()))
    }

    /// All accepted nodes ordered by index.
    pub fn nodes(&self) -> Vec<GroupedNode<'a>> {
        let mut nodes: Vec<_> = self.groups.values().flatten().copied().collect();
        nodes.sort_by_key(|n| n.index);
        nodes
    }

    pub fn max_depth(&self) -> u32 {
        self.groups.keys().next_back().copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn skipped(&self) -> &[SkippedNode] {
        &self.skipped
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn tree_strategy() -> impl Strategy<Value = TreeNode> {
        let leaf = "[a-z]{1,6}".prop_map(|name| TreeNode::new(name, 0));
        leaf.prop_recursive(4, 64, 5, |inner| {
            ("[a-z]{1,6}", prop::collection::vec(inner, 0..5)).prop_map(|(name, children)| {
                let mut node = TreeNode::new(name, 0);
                node.children = Some(children);
                node
            })
        })
    }

    fn fix_depths(node: &mut TreeNode, depth: u32) {
        node.depth = depth;
        if let Some(children) = node.children.as_mut() {
            for child in children {
                fix_depths(child, depth + 1);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_groups_cover_every_node_once(mut tree in tree_strategy()) {
            fix_depths(&mut tree, 0);
            let groups = DepthGroups::from_tree(&tree);

            prop_assert_eq!(groups.depth(0).len(), 1);
            let total: usize = groups.iter().map(|(_, nodes)| nodes.len()).sum();
            prop_assert_eq!(total, tree.node_count());
            prop_assert!(groups.skipped().is_empty());
        }

        #[test]
        fn prop_grouping_is_deterministic(mut tree in tree_strategy()) {
            fix_depths(&mut tree, 0);
            let a = DepthGroups::from_tree(&tree);
            let b = DepthGroups::from_tree(&tree);
            let a_nodes: Vec<_> = a.nodes().iter().map(|n| (n.index, n.depth, n.parent)).collect();
            let b_nodes: Vec<_> = b.nodes().iter().map(|n| (n.index, n.depth, n.parent)).collect();
            prop_assert_eq!(a_nodes, b_nodes);
        }
    }
}
