// 🔍 Tree filter - search and visibility views over a built forest
//
// A node survives when it matches or when any descendant survives, so
// every match stays reachable through its ancestors. The input tree is
// never touched; the view is a fresh copy.

use crate::key::{canonical_key, canonical_text, RecordId};
use crate::tree::TreeNode;
use serde::Deserialize;
use std::collections::HashSet;

// ============================================================================
// FILTER QUERY
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    /// Case-insensitive substring matched against node names
    #[serde(default)]
    pub search_term: Option<String>,

    /// Ids to keep (any kind); takes precedence over `search_term` when
    /// non-empty
    #[serde(default)]
    pub visible_ids: Vec<RecordId>,
}

impl FilterQuery {
    pub fn search(term: &str) -> Self {
        FilterQuery {
            search_term: Some(term.to_string()),
            visible_ids: Vec::new(),
        }
    }

    pub fn visible<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RecordId>,
    {
        FilterQuery {
            search_term: None,
            visible_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated id list ("1,2, 7")
    pub fn visible_from_csv(raw: &str) -> Self {
        FilterQuery::visible(
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| RecordId::from(canonical_text(id))),
        )
    }

    fn mode(&self) -> Option<Matcher> {
        if !self.visible_ids.is_empty() {
            let ids = self.visible_ids.iter().map(canonical_key).collect();
            return Some(Matcher::Ids(ids));
        }
        match self.search_term.as_deref() {
            Some(term) if !term.is_empty() => Some(Matcher::Name(term.to_lowercase())),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mode().is_none()
    }
}

enum Matcher {
    Ids(HashSet<String>),
    Name(String),
}

impl Matcher {
    fn matches(&self, node: &TreeNode) -> bool {
        match self {
            Matcher::Ids(ids) => ids.contains(&node.key()),
            Matcher::Name(term) => node.name.to_lowercase().contains(term.as_str()),
        }
    }
}

// ============================================================================
// FILTERING
// ============================================================================

/// Filtered copy of the forest. With neither a search term nor visible ids
/// the tree comes back unchanged; an empty result is valid.
pub fn filter_tree(roots: &[TreeNode], query: &FilterQuery) -> Vec<TreeNode> {
    match query.mode() {
        Some(matcher) => roots.iter().filter_map(|root| prune(root, &matcher)).collect(),
        None => roots.to_vec(),
    }
}

fn prune(node: &TreeNode, matcher: &Matcher) -> Option<TreeNode> {
    let children: Vec<TreeNode> = node
        .children
        .iter()
        .filter_map(|child| prune(child, matcher))
        .collect();

    if matcher.matches(node) || !children.is_empty() {
        Some(node.with_children(children))
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
