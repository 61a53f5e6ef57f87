// 🏗️ Category tree builder - flat category rows → forest
//
// Two passes: index every category by canonical key, then attach each one
// to its parent (or make it a root when the parent is absent). Nodes are
// materialized top-down from the roots, so every child's `parent` is the
// id of the node whose `children` holds it.

use crate::config::TreeConfig;
use crate::entities::Category;
use crate::tree::{NodeDetail, TreeNode};
use crate::warnings::{DataIntegrityWarning, Warnings};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

// ============================================================================
// BUILD OUTCOME
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOutcome {
    pub roots: Vec<TreeNode>,
    pub warnings: Warnings,
}

// ============================================================================
// CATEGORY TREE BUILDER
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct CategoryTreeBuilder {
    include_system: bool,
    include_user: bool,
}

impl Default for CategoryTreeBuilder {
    fn default() -> Self {
        CategoryTreeBuilder {
            include_system: true,
            include_user: true,
        }
    }
}

impl CategoryTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        CategoryTreeBuilder {
            include_system: config.include_system,
            include_user: config.include_user,
        }
    }

    pub fn include_system(mut self, include: bool) -> Self {
        self.include_system = include;
        self
    }

    pub fn include_user(mut self, include: bool) -> Self {
        self.include_user = include;
        self
    }

    fn includes(&self, category: &Category) -> bool {
        if category.is_system() {
            self.include_system
        } else {
            self.include_user
        }
    }

    /// Build the category forest.
    ///
    /// Duplicate ids keep the last occurrence (at the first occurrence's
    /// position). A category whose parent is missing or excluded becomes a
    /// root; categories caught in a parent cycle are promoted to roots too.
    pub fn build(&self, categories: &[Category]) -> BuildOutcome {
        let mut warnings = Warnings::new();

        // Pass 1: id → category, last occurrence wins
        let mut order: Vec<String> = Vec::new();
        let mut by_key: HashMap<String, &Category> = HashMap::new();
        for category in categories {
            let key = category.id.key();
            if by_key.insert(key.clone(), category).is_some() {
                warnings.push_unique(DataIntegrityWarning::DuplicateCategoryId { id: key });
            } else {
                order.push(key);
            }
        }

        let declared: HashSet<&String> = by_key.keys().collect();
        let included: HashMap<&String, &Category> = by_key
            .iter()
            .filter(|(_, category)| self.includes(category))
            .map(|(key, category)| (key, *category))
            .collect();

        // Pass 2: link to parents
        let mut root_keys: Vec<&String> = Vec::new();
        let mut children_of: HashMap<&String, Vec<&String>> = HashMap::new();
        for key in order.iter().filter(|key| included.contains_key(key)) {
            let category = included[key];
            match category.parent_key() {
                Some(parent) if parent == *key => {
                    warnings.push(DataIntegrityWarning::CycleDetected { id: key.clone() });
                    root_keys.push(key);
                }
                Some(parent) => match included.get_key_value(&parent) {
                    Some((parent_key, _)) => children_of.entry(*parent_key).or_default().push(key),
                    None => {
                        if !declared.contains(&parent) {
                            warnings.push(DataIntegrityWarning::OrphanedCategory {
                                id: key.clone(),
                                parent,
                            });
                        }
                        root_keys.push(key);
                    }
                },
                None => root_keys.push(key),
            }
        }

        let mut placed: HashSet<&String> = HashSet::new();
        let mut roots: Vec<TreeNode> = root_keys
            .iter()
            .map(|key| materialize(*key, None, &included, &children_of, &mut placed))
            .collect();

        // Anything still unplaced hangs off a parent cycle
        for key in order.iter().filter(|key| included.contains_key(key)) {
            if !placed.contains(key) {
                warnings.push(DataIntegrityWarning::CycleDetected { id: key.clone() });
                roots.push(materialize(key, None, &included, &children_of, &mut placed));
            }
        }

        debug!(
            categories = categories.len(),
            placed = placed.len(),
            roots = roots.len(),
            "built category forest"
        );

        BuildOutcome { roots, warnings }
    }
}

fn materialize<'a>(
    key: &'a String,
    parent: Option<&Category>,
    included: &HashMap<&'a String, &'a Category>,
    children_of: &HashMap<&'a String, Vec<&'a String>>,
    placed: &mut HashSet<&'a String>,
) -> TreeNode {
    placed.insert(key);
    let category = included[key];

    let mut children = Vec::new();
    if let Some(child_keys) = children_of.get(key) {
        for child in child_keys {
            if !placed.contains(child) {
                children.push(materialize(*child, Some(category), included, children_of, placed));
            }
        }
    }

    TreeNode {
        id: category.id.clone(),
        name: category.name.clone(),
        parent: parent.map(|p| p.id.clone()),
        detail: NodeDetail::Category {
            is_custom: category.is_custom,
            owner_id: category.owner_id.clone(),
        },
        children,
    }
}

/// Build with default flags (system and user categories included)
pub fn build_category_tree(categories: &[Category]) -> BuildOutcome {
    CategoryTreeBuilder::new().build(categories)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::RecordId;

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_food_restaurants_example() {
        let categories = vec![
            Category::system(1, "Food", None),
            Category::custom(2, "Restaurants", Some(RecordId::from(1))),
        ];

        let outcome = build_category_tree(&categories);

        assert_eq!(names(&outcome.roots), vec!["Food"]);
        assert_eq!(names(&outcome.roots[0].children), vec!["Restaurants"]);
        assert_eq!(outcome.roots[0].children[0].parent, Some(RecordId::from(1)));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_children_preserve_source_order() {
        let categories = vec![
            Category::custom(10, "Zeta", Some(RecordId::from(1))),
            Category::system(1, "Root", None),
            Category::custom(11, "Alpha", Some(RecordId::from(1))),
            Category::custom(12, "Mid", Some(RecordId::from(1))),
        ];

        let outcome = build_category_tree(&categories);
        assert_eq!(names(&outcome.roots[0].children), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_missing_parent_promoted_to_root() {
        let categories = vec![Category::custom(5, "Lonely", Some(RecordId::from(99)))];

        let outcome = build_category_tree(&categories);

        assert_eq!(names(&outcome.roots), vec!["Lonely"]);
        assert_eq!(outcome.roots[0].parent, None);
        assert_eq!(outcome.warnings.count_of("orphaned_category"), 1);
    }

    #[test]
    fn test_excluded_parent_promotes_without_warning() {
        let categories = vec![
            Category::system(1, "Food", None),
            Category::custom(2, "My Snacks", Some(RecordId::from(1))),
        ];

        let outcome = CategoryTreeBuilder::new().include_system(false).build(&categories);

        assert_eq!(names(&outcome.roots), vec!["My Snacks"]);
        assert_eq!(outcome.roots[0].parent, None);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_include_user_false_drops_custom() {
        let categories = vec![
            Category::system(1, "Food", None),
            Category::custom(2, "My Snacks", Some(RecordId::from(1))),
        ];

        let outcome = CategoryTreeBuilder::new().include_user(false).build(&categories);

        assert_eq!(names(&outcome.roots), vec!["Food"]);
        assert!(outcome.roots[0].children.is_empty());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let categories = vec![
            Category::system(1, "Old Name", None),
            Category::system(2, "Other", None),
            Category::system("1", "New Name", None),
        ];

        let outcome = build_category_tree(&categories);

        assert_eq!(names(&outcome.roots), vec!["New Name", "Other"]);
        assert_eq!(outcome.warnings.count_of("duplicate_category_id"), 1);
    }

    #[test]
    fn test_string_parent_matches_numeric_id() {
        let categories = vec![
            Category::system(1, "Transport", None),
            Category::custom("2", "Gas", Some(RecordId::from("1"))),
        ];

        let outcome = build_category_tree(&categories);

        assert_eq!(outcome.roots.len(), 1);
        assert_eq!(names(&outcome.roots[0].children), vec!["Gas"]);
    }

    #[test]
    fn test_parent_cycle_is_broken_not_dropped() {
        let categories = vec![
            Category::custom("a", "A", Some(RecordId::from("b"))),
            Category::custom("b", "B", Some(RecordId::from("a"))),
            Category::custom("c", "C", Some(RecordId::from("c"))),
        ];

        let outcome = build_category_tree(&categories);

        assert_eq!(names(&outcome.roots), vec!["C", "A"]);
        assert_eq!(names(&outcome.roots[1].children), vec!["B"]);
        assert_eq!(outcome.roots[1].children[0].parent, Some(RecordId::from("a")));
        assert_eq!(outcome.warnings.count_of("cycle_detected"), 2);
    }
}
