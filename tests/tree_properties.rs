use category_tree::{
    build_category_tree, build_tree, filter_tree, AggregateCalculator, Category, DropPosition,
    FilterQuery, MoveError, NodeDetail, NodeKind, NodeRef, RecordId, SourceSnapshot,
    TransactionRecord, TreeConfig, TreeMutator, TreeNavigator, TreeNode, VendorRecord,
};
use proptest::prelude::*;
use std::collections::HashSet;

const NAMES: &[&str] = &["Food", "Fast Food", "Travel", "Rent", "Gas", "Groceries", "Fun"];

// ============================================================================
// GENERATORS
// ============================================================================

/// Parent pointers anywhere in 0..n (self-loops and cycles included)
fn arbitrary_categories() -> impl Strategy<Value = Vec<Category>> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec((prop::option::of(0..n + 2), 0..NAMES.len(), any::<bool>()), n).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (parent, name, custom))| {
                        let parent = parent.map(|p| RecordId::from(p as i64));
                        if custom {
                            Category::custom(i as i64, NAMES[name], parent)
                        } else {
                            Category::system(i as i64, NAMES[name], parent)
                        }
                    })
                    .collect()
            },
        )
    })
}

/// Acyclic, custom-only categories: parent index always below the child's
fn acyclic_categories() -> impl Strategy<Value = Vec<Category>> {
    (2usize..12).prop_flat_map(|n| {
        prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), 0..NAMES.len()), n).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (index, is_root, name))| {
                        let parent = if i == 0 || is_root {
                            None
                        } else {
                            Some(RecordId::from(index.index(i) as i64))
                        };
                        Category::custom(i as i64, NAMES[name], parent)
                    })
                    .collect()
            },
        )
    })
}

fn transactions_for(count: usize) -> impl Strategy<Value = Vec<TransactionRecord>> {
    prop::collection::vec((0..count + 2, -10_000i64..10_000, 0..NAMES.len()), 0..25).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (category, cents, name))| {
                TransactionRecord::new(i as i64, category as i64, cents as f64 / 100.0)
                    .with_description(NAMES[name])
                    .with_date("2024-03-01")
            })
            .collect()
    })
}

/// Snapshot with external vendors, vendor links that may point across
/// categories, and colliding transaction ids
fn linked_snapshot() -> impl Strategy<Value = SourceSnapshot> {
    acyclic_categories().prop_flat_map(|categories| {
        let count = categories.len();
        let vendors = prop::collection::vec((0usize..5, 0..count + 1, 0..NAMES.len()), 0..6).prop_map(
            |rows| {
                rows.into_iter()
                    .map(|(id, parent, name)| {
                        VendorRecord::new(format!("v{}", id), NAMES[name], parent as i64)
                    })
                    .collect::<Vec<_>>()
            },
        );
        let transactions = prop::collection::vec(
            (0i64..15, 0..count + 1, prop::option::of(0usize..6), -10_000i64..10_000, 0..NAMES.len()),
            0..30,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(id, category, vendor, cents, name)| {
                    let tx = TransactionRecord::new(id, category as i64, cents as f64 / 100.0)
                        .with_description(NAMES[name])
                        .with_date("2024-03-01");
                    match vendor {
                        Some(v) => tx.with_vendor(format!("v{}", v)),
                        None => tx,
                    }
                })
                .collect::<Vec<_>>()
        });
        (Just(categories), vendors, transactions).prop_map(|(categories, vendors, transactions)| {
            SourceSnapshot {
                categories,
                transactions,
                vendors,
                ..SourceSnapshot::default()
            }
        })
    })
}

fn with_transactions() -> impl Strategy<Value = (Vec<Category>, Vec<TransactionRecord>)> {
    acyclic_categories().prop_flat_map(|categories| {
        let count = categories.len();
        (Just(categories), transactions_for(count))
    })
}

// ============================================================================
// HELPERS
// ============================================================================

fn assert_parent_links(nodes: &[TreeNode], container: Option<&RecordId>) {
    for node in nodes {
        match (container, &node.parent) {
            (Some(expected), Some(actual)) => assert!(expected.same_as(actual)),
            (None, None) => {}
            (expected, actual) => panic!("parent mismatch: {:?} vs {:?}", expected, actual),
        }
        assert_parent_links(&node.children, Some(&node.id));
    }
}

fn subtree_keys(node: &TreeNode, out: &mut HashSet<String>) {
    if node.is_category() {
        out.insert(node.key());
    }
    for child in &node.children {
        subtree_keys(child, out);
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn every_category_placed_exactly_once(categories in arbitrary_categories()) {
        let outcome = build_category_tree(&categories);
        let nav = TreeNavigator::new(&outcome.roots);

        let keys: Vec<String> = nav.walk().map(TreeNode::key).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(keys.len(), unique.len());
        prop_assert_eq!(keys.len(), categories.len());

        assert_parent_links(&outcome.roots, None);
    }

    #[test]
    fn full_tree_ids_are_unique_per_kind(snapshot in linked_snapshot()) {
        let config = TreeConfig {
            include_transaction_leaves: true,
            ..TreeConfig::default()
        };
        let build = build_tree(&snapshot, &config);
        let nav = build.navigator();

        let mut seen = HashSet::new();
        for node in nav.walk() {
            prop_assert!(seen.insert((node.key(), node.kind())));
        }
        assert_parent_links(&build.roots, None);

        for vendor in nav.walk().filter(|n| n.kind() == NodeKind::Vendor) {
            let leaves: f64 = vendor
                .children
                .iter()
                .map(|leaf| match leaf.detail {
                    NodeDetail::Transaction { amount, .. } => amount,
                    _ => 0.0,
                })
                .sum();
            prop_assert!((vendor.total_amount() - leaves).abs() < 1e-6);
            let is_counted = matches!(
                vendor.detail,
                NodeDetail::Vendor { transaction_count, .. } if transaction_count == vendor.children.len()
            );
            prop_assert!(is_counted);
        }
    }

    #[test]
    fn filtering_is_idempotent(
        categories in arbitrary_categories(),
        term in prop::sample::select(vec!["", "food", "FOOD", "o", "travel", "zzz"]),
    ) {
        let roots = build_category_tree(&categories).roots;
        let query = FilterQuery::search(term);

        let once = filter_tree(&roots, &query);
        let twice = filter_tree(&once, &query);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn dropping_inside_a_descendant_is_circular(categories in acyclic_categories()) {
        let roots = build_category_tree(&categories).roots;
        let nav = TreeNavigator::new(&roots);
        let mutator = TreeMutator::new(&roots);

        for ancestor in nav.walk() {
            for descendant in TreeNavigator::new(&ancestor.children).walk() {
                let result = mutator.validate_move(
                    &ancestor.node_ref(),
                    &descendant.node_ref(),
                    DropPosition::Inside,
                );
                let is_circular = matches!(result, Err(MoveError::CircularDependency { .. }));
                prop_assert!(is_circular);
            }
        }
    }

    #[test]
    fn root_totals_cover_their_subtrees(
        (categories, transactions) in with_transactions()
    ) {
        let roots = build_category_tree(&categories).roots;
        let calc = AggregateCalculator::new(&transactions, &categories);

        for root in &roots {
            let mut keys = HashSet::new();
            subtree_keys(root, &mut keys);
            let expected: f64 = transactions
                .iter()
                .filter(|tx| tx.category_key().map_or(false, |key| keys.contains(&key)))
                .filter_map(TransactionRecord::absolute_amount)
                .sum();

            let total = calc.category_total(&root.id);
            prop_assert!((total - expected).abs() < 1e-6, "{} vs {}", total, expected);
        }
    }
}

// ============================================================================
// WORKED EXAMPLES
// ============================================================================

fn food_and_restaurants() -> Vec<Category> {
    vec![
        Category::system(1, "Food", None),
        Category::custom(2, "Restaurants", Some(RecordId::from(1))),
    ]
}

#[test]
fn test_food_restaurants_tree_and_totals() {
    let categories = food_and_restaurants();
    let transactions = vec![TransactionRecord::new(1, 2, -12.3)];

    let roots = build_category_tree(&categories).roots;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "Food");
    assert_eq!(roots[0].children[0].name, "Restaurants");

    let calc = AggregateCalculator::new(&transactions, &categories);
    assert_eq!(calc.category_total(&RecordId::from(1)), 12.3);
    assert_eq!(calc.category_total(&RecordId::from(2)), 12.3);
}

#[test]
fn test_string_parent_attaches_to_numeric_category() {
    let snapshot = SourceSnapshot {
        categories: food_and_restaurants(),
        vendors: vec![VendorRecord::new("v1", "Shell", "1")],
        ..SourceSnapshot::default()
    };

    let build = build_tree(&snapshot, &TreeConfig::default());
    let nav = build.navigator();

    let shell = nav
        .find_node(&RecordId::from("v1"), Some(NodeKind::Vendor))
        .unwrap();
    assert!(shell.parent.as_ref().unwrap().same_as(&RecordId::from(1)));
    assert!(build.warnings.is_empty());
}

#[test]
fn test_self_drop() {
    let roots = build_category_tree(&food_and_restaurants()).roots;
    let result = TreeMutator::new(&roots).validate_move(
        &NodeRef::category(1),
        &NodeRef::category(1),
        DropPosition::Inside,
    );
    assert!(matches!(result, Err(MoveError::SelfDrop { .. })));
}

#[test]
fn test_parent_inside_child_is_circular() {
    let categories = vec![
        Category::custom("a", "A", None),
        Category::custom("b", "B", Some(RecordId::from("a"))),
    ];
    let roots = build_category_tree(&categories).roots;
    let result = TreeMutator::new(&roots).validate_move(
        &NodeRef::category("a"),
        &NodeRef::category("b"),
        DropPosition::Inside,
    );
    assert!(matches!(result, Err(MoveError::CircularDependency { .. })));
}

#[test]
fn test_visible_ids_keep_ancestors_only() {
    let mut categories = food_and_restaurants();
    categories.push(Category::custom(3, "Groceries", Some(RecordId::from(1))));
    categories.push(Category::custom(4, "Travel", None));
    let roots = build_category_tree(&categories).roots;

    let view = filter_tree(&roots, &FilterQuery::visible([2]));

    assert_eq!(view.len(), 1);
    assert_eq!(view[0].name, "Food");
    assert_eq!(view[0].children.len(), 1);
    assert_eq!(view[0].children[0].name, "Restaurants");
}
