use crate::{NodeDefect, Principle};
use serde::{Deserialize, Serialize};

/// One analysed term and the terms discovered beneath it.
///
/// Accepts the analysis service's field names (`term`, `processing_time_ms`) as well as
/// the viewer's own (`name`, `processingTime`). `children` may arrive either as a list or
/// as an object keyed by child term; both keep document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, alias = "term")]
    pub name: String,
    #[serde(default)]
    pub principles: Vec<Principle>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "children_repr::deserialize"
    )]
    pub children: Option<Vec<TreeNode>>,
    #[serde(default)]
    pub depth: u32,
    #[serde(default, rename = "processingTime", alias = "processing_time_ms")]
    pub processing_time_ms: u64,
}

impl TreeNode {
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth,
            ..Default::default()
        }
    }

    pub fn with_principles(mut self, principles: Vec<Principle>) -> Self {
        self.principles = principles;
        self
    }

    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Check the fields the layout relies on.
    pub fn check(&self, expected_depth: u32) -> Result<(), NodeDefect> {
        if self.name.trim().is_empty() {
            return Err(NodeDefect::MissingName);
        }
        if self.depth != expected_depth {
            return Err(NodeDefect::DepthMismatch {
                expected: expected_depth,
                found: self.depth,
            });
        }
        Ok(())
    }

    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.pre_order().count()
    }

    pub fn total_principles(&self) -> usize {
        self.pre_order().map(|node| node.principles.len()).sum()
    }

    /// Deepest `depth` value found anywhere in the tree.
    pub fn max_depth(&self) -> u32 {
        self.pre_order().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TreeNode> {
        self.pre_order().find(|node| node.name == name)
    }
}

/// Pre-order walk: parent first, then children in sibling order.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

mod children_repr {
    use super::TreeNode;
    use serde::Deserializer;
    use serde::de::{MapAccess, SeqAccess, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<TreeNode>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ChildrenVisitor)
    }

    struct ChildrenVisitor;

    impl<'de> Visitor<'de> for ChildrenVisitor {
        type Value = Option<Vec<TreeNode>>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of child nodes or a map from term to child node")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(ChildrenVisitor)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut children = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(child) = seq.next_element::<TreeNode>()? {
                children.push(child);
            }
            Ok(Some(children))
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut children = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((term, mut child)) = map.next_entry::<String, TreeNode>()? {
                if child.name.is_empty() {
                    child.name = term;
                }
                children.push(child);
            }
            Ok(Some(children))
        }
    }
}
