// 🧭 Tree navigation - lookups over a built forest
//
// All searches are depth-first, pre-order, roots in array order; the first
// match wins.

use crate::key::{canonical_key, RecordId};
use crate::tree::{NodeKind, TreeNode};
use std::collections::HashMap;

// ============================================================================
// PRE-ORDER WALK
// ============================================================================

/// Pre-order iterator over every node of a forest.
pub struct Walk<'t> {
    stack: Vec<&'t TreeNode>,
}

impl<'t> Walk<'t> {
    fn new(roots: &'t [TreeNode]) -> Self {
        Walk {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'t> Iterator for Walk<'t> {
    type Item = &'t TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ============================================================================
// TREE NAVIGATOR
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct TreeNavigator<'t> {
    roots: &'t [TreeNode],
}

impl<'t> TreeNavigator<'t> {
    pub fn new(roots: &'t [TreeNode]) -> Self {
        TreeNavigator { roots }
    }

    pub fn walk(&self) -> Walk<'t> {
        Walk::new(self.roots)
    }

    /// First node (pre-order) with this id, optionally restricted to a kind
    pub fn find_node(&self, id: &RecordId, kind: Option<NodeKind>) -> Option<&'t TreeNode> {
        self.find_by_key(&canonical_key(id), kind)
    }

    pub fn find_by_key(&self, key: &str, kind: Option<NodeKind>) -> Option<&'t TreeNode> {
        self.walk().find(|node| node.matches(key, kind))
    }

    /// Ids of every category node, pre-order
    pub fn all_category_ids(&self) -> Vec<RecordId> {
        self.walk()
            .filter(|node| node.is_category())
            .map(|node| node.id.clone())
            .collect()
    }

    /// Category key → parent category id (`None` for root categories).
    /// Vendor and transaction links are not included.
    pub fn parent_map(&self) -> HashMap<String, Option<RecordId>> {
        self.walk()
            .filter(|node| node.is_category())
            .map(|node| (node.key(), node.parent.clone()))
            .collect()
    }

    /// True when the category has at least one category child
    /// (vendor and transaction children don't count)
    pub fn has_child_category(&self, id: &RecordId) -> bool {
        self.find_node(id, Some(NodeKind::Category))
            .map(|node| node.children.iter().any(TreeNode::is_category))
            .unwrap_or(false)
    }

    /// Direct children of a node; empty when the node does not exist
    pub fn children_of(&self, id: &RecordId, kind: NodeKind) -> &'t [TreeNode] {
        self.find_node(id, Some(kind))
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Names from the root down to the node (inclusive)
    ///
    /// Example: "Fast Food" → ["Food & Dining", "Restaurants", "Fast Food"]
    pub fn path_to(&self, id: &RecordId, kind: NodeKind) -> Option<Vec<String>> {
        let key = canonical_key(id);
        let mut path = Vec::new();
        for root in self.roots {
            if path_into(root, &key, kind, &mut path) {
                return Some(path);
            }
        }
        None
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }
}

fn path_into(node: &TreeNode, key: &str, kind: NodeKind, path: &mut Vec<String>) -> bool {
    path.push(node.name.clone());
    if node.matches(key, Some(kind)) {
        return true;
    }
    for child in &node.children {
        if path_into(child, key, kind, path) {
            return true;
        }
    }
    path.pop();
    false
}

// ============================================================================
// TESTS
// ============================================================================
