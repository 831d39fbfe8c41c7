use conceptree_core::{Principle, PrincipleCategory, TreeNode};

/// Breadth-first synthetic tree of exactly `node_count` nodes, each parent holding up to
/// `branching` children. Confidences cycle so every tier is represented.
pub fn generate_synthetic_tree(node_count: usize, branching: usize) -> TreeNode {
    let branching = branching.max(1);
    let mut nodes: Vec<TreeNode> = (0..node_count.max(1))
        .map(|i| {
            let depth = depth_of(i, branching);
            let confidence = [0.95, 0.7, 0.4][i % 3];
            TreeNode::new(format!("term_{i}"), depth).with_principles(vec![Principle::new(
                format!("principle_{i}"),
                PrincipleCategory::ALL[i % PrincipleCategory::ALL.len()],
                confidence,
            )])
        })
        .collect();

    // Attach children back to front so every subtree is complete before it moves.
    for i in (1..nodes.len()).rev() {
        let parent = (i - 1) / branching;
        let child = std::mem::take(&mut nodes[i]);
        let siblings = nodes[parent].children.get_or_insert_with(Vec::new);
        siblings.insert(0, child);
    }
    nodes.swap_remove(0)
}

fn depth_of(mut index: usize, branching: usize) -> u32 {
    let mut depth = 0;
    while index > 0 {
        index = (index - 1) / branching;
        depth += 1;
    }
    depth
}
