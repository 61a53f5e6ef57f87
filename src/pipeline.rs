// 🌳 Tree pipeline - snapshot in, navigable tree out
//
// builder → external vendors → synthesized vendors. Each stage consumes the
// previous stage's roots; warnings from every stage are merged in order.

use crate::aggregate::{AggregateCalculator, TotalsReport};
use crate::builder::CategoryTreeBuilder;
use crate::config::TreeConfig;
use crate::navigator::TreeNavigator;
use crate::snapshot::SourceSnapshot;
use crate::tree::TreeNode;
use crate::vendors::VendorMerger;
use crate::warnings::Warnings;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeBuild {
    pub roots: Vec<TreeNode>,
    pub warnings: Warnings,
}

impl TreeBuild {
    pub fn navigator(&self) -> TreeNavigator<'_> {
        TreeNavigator::new(&self.roots)
    }
}

/// Build the full category/vendor/transaction tree for a snapshot
pub fn build_tree(snapshot: &SourceSnapshot, config: &TreeConfig) -> TreeBuild {
    let mut warnings = Warnings::new();

    let categories = CategoryTreeBuilder::from_config(config).build(&snapshot.categories);
    warnings.extend(categories.warnings);
    debug!(roots = categories.roots.len(), "category stage done");

    let merger = VendorMerger::from_config(config, snapshot.name_table());

    let merged = merger.merge(categories.roots, &snapshot.vendors, &snapshot.transactions);
    warnings.extend(merged.warnings);

    let build = TreeBuild {
        roots: merged.roots,
        warnings,
    };

    info!(
        roots = build.roots.len(),
        nodes = build.navigator().node_count(),
        warnings = build.warnings.len(),
        "built tree"
    );

    build
}

/// Recursive totals for every category in the snapshot
pub fn compute_totals(snapshot: &SourceSnapshot) -> TotalsReport {
    AggregateCalculator::new(&snapshot.transactions, &snapshot.categories).totals()
}

// ============================================================================
// TESTS
// ============================================================================
