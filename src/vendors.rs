// 🏪 Vendor merger - vendor and transaction leaves under categories
//
// Two independent sources, exclusive per category:
// - external vendor records, each naming its parent category
// - vendors synthesized by grouping a category's transactions on their
//   effective vendor name
// A category that received any external vendor is skipped by synthesis.

use crate::builder::BuildOutcome;
use crate::config::TreeConfig;
use crate::entities::{dedup_by_id, NameMappingTable, TransactionRecord, VendorRecord};
use crate::key::RecordId;
use crate::navigator::TreeNavigator;
use crate::tree::{NodeDetail, NodeKind, TreeNode};
use crate::warnings::{DataIntegrityWarning, Warnings};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Stable id for a synthesized vendor: same category + same name → same id
pub fn synthesized_vendor_id(category_key: &str, vendor_name: &str) -> String {
    format!("vendor:{}:{}", category_key, vendor_name)
}

// ============================================================================
// VENDOR MERGER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct VendorMerger {
    names: NameMappingTable,
    include_transaction_leaves: bool,
}

impl VendorMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TreeConfig, names: NameMappingTable) -> Self {
        VendorMerger {
            names,
            include_transaction_leaves: config.include_transaction_leaves,
        }
    }

    pub fn with_name_mappings(mut self, names: NameMappingTable) -> Self {
        self.names = names;
        self
    }

    pub fn include_transaction_leaves(mut self, include: bool) -> Self {
        self.include_transaction_leaves = include;
        self
    }

    /// Both vendor sources in one pass: external vendors first, then
    /// synthesis for every category left without one. Transaction ids are
    /// deduplicated once for both stages.
    pub fn merge(
        &self,
        roots: Vec<TreeNode>,
        vendors: &[VendorRecord],
        transactions: &[TransactionRecord],
    ) -> BuildOutcome {
        let mut warnings = Warnings::new();
        let txs = unique_transactions(transactions, &mut warnings);

        let roots = self.attach(roots, vendors, &txs, &mut warnings);
        let roots = self.synthesize(roots, &txs, &mut warnings);
        BuildOutcome { roots, warnings }
    }

    /// Attach externally supplied vendors to their parent categories.
    ///
    /// Parents resolve through canonical keys, so `"1"` finds category `1`.
    /// Records with no matching category are dropped with a warning. Totals
    /// come from transactions whose `vendorId` names the vendor and whose
    /// `categoryId` is the vendor's parent.
    pub fn attach_external_vendors(
        &self,
        roots: Vec<TreeNode>,
        vendors: &[VendorRecord],
        transactions: &[TransactionRecord],
    ) -> BuildOutcome {
        let mut warnings = Warnings::new();
        let txs = unique_transactions(transactions, &mut warnings);
        let roots = self.attach(roots, vendors, &txs, &mut warnings);
        BuildOutcome { roots, warnings }
    }

    /// Group each category's transactions into vendor nodes.
    ///
    /// Runs only for categories without external vendors. Vendors are named
    /// by mapping, else description, else "Unknown Vendor", and ordered by
    /// descending total.
    pub fn synthesize_vendors_from_transactions(
        &self,
        roots: Vec<TreeNode>,
        transactions: &[TransactionRecord],
    ) -> BuildOutcome {
        let mut warnings = Warnings::new();
        let txs = unique_transactions(transactions, &mut warnings);
        let roots = self.synthesize(roots, &txs, &mut warnings);
        BuildOutcome { roots, warnings }
    }

    fn attach(
        &self,
        mut roots: Vec<TreeNode>,
        vendors: &[VendorRecord],
        transactions: &[&TransactionRecord],
        warnings: &mut Warnings,
    ) -> Vec<TreeNode> {
        let category_keys: HashSet<String> = TreeNavigator::new(&roots)
            .all_category_ids()
            .iter()
            .map(RecordId::key)
            .collect();

        // Vendor key → parent category key, for accepted records only
        let mut parent_of: HashMap<String, String> = HashMap::new();
        let mut by_parent: HashMap<String, Vec<&VendorRecord>> = HashMap::new();
        for vendor in vendors {
            let parent_key = vendor.parent.as_ref().map(RecordId::key);
            let Some(parent_key) = parent_key.filter(|key| category_keys.contains(key)) else {
                warnings.push(DataIntegrityWarning::OrphanedVendor {
                    vendor_id: vendor.id.key(),
                    parent: vendor.parent.as_ref().map(RecordId::to_string).unwrap_or_default(),
                });
                continue;
            };
            if parent_of.contains_key(&vendor.id.key()) {
                warnings.push(DataIntegrityWarning::DuplicateVendorId { vendor_id: vendor.id.key() });
                continue;
            }
            parent_of.insert(vendor.id.key(), parent_key.clone());
            by_parent.entry(parent_key).or_default().push(vendor);
        }

        let mut by_vendor: HashMap<String, Vec<&TransactionRecord>> = HashMap::new();
        for tx in transactions {
            let Some(vendor_key) = tx.vendor_id.as_ref().map(RecordId::key) else {
                continue;
            };
            let Some(parent_key) = parent_of.get(&vendor_key) else {
                continue;
            };
            match tx.category_key() {
                Some(category) if category == *parent_key => {
                    by_vendor.entry(vendor_key).or_default().push(*tx);
                }
                category => warnings.push(DataIntegrityWarning::MismatchedVendorCategory {
                    transaction_id: tx.id.key(),
                    vendor_id: vendor_key,
                    category: category.unwrap_or_default(),
                }),
            }
        }

        let mut attached = 0;
        visit_categories_mut(&mut roots, &mut |category| {
            let Some(records) = by_parent.get(&category.key()) else {
                return;
            };
            for record in records {
                let txs = by_vendor.get(&record.id.key()).map(Vec::as_slice).unwrap_or(&[]);
                let vendor = self.vendor_node(
                    record.id.clone(),
                    record.name.clone(),
                    &category.id,
                    txs,
                    warnings,
                );
                category.children.push(vendor);
                attached += 1;
            }
            sort_vendor_children(category);
        });

        debug!(vendors = vendors.len(), attached, "attached external vendors");
        roots
    }

    fn synthesize(
        &self,
        mut roots: Vec<TreeNode>,
        transactions: &[&TransactionRecord],
        warnings: &mut Warnings,
    ) -> Vec<TreeNode> {
        let mut by_category: HashMap<String, Vec<&TransactionRecord>> = HashMap::new();
        for tx in transactions {
            match tx.category_key() {
                Some(key) => by_category.entry(key).or_default().push(*tx),
                None => warnings.push(DataIntegrityWarning::UnassignedTransaction {
                    transaction_id: tx.id.key(),
                }),
            }
        }

        let mut synthesized = 0;
        visit_categories_mut(&mut roots, &mut |category| {
            if category.children.iter().any(|c| c.kind() == NodeKind::Vendor) {
                return;
            }
            let category_key = category.key();
            let Some(txs) = by_category.get(&category_key) else {
                return;
            };

            // Group by effective name, first-seen order
            let mut groups: Vec<(String, Vec<&TransactionRecord>)> = Vec::new();
            let mut index: HashMap<String, usize> = HashMap::new();
            for tx in txs {
                let name = self.names.effective_name(tx.description_text());
                match index.get(&name) {
                    Some(&i) => groups[i].1.push(*tx),
                    None => {
                        index.insert(name.clone(), groups.len());
                        groups.push((name, vec![*tx]));
                    }
                }
            }

            for (name, group) in groups {
                let id = RecordId::Text(synthesized_vendor_id(&category_key, &name));
                let vendor = self.vendor_node(id, name, &category.id, &group, warnings);
                category.children.push(vendor);
                synthesized += 1;
            }
            sort_vendor_children(category);
        });

        debug!(transactions = transactions.len(), synthesized, "synthesized vendors");
        roots
    }

    fn vendor_node(
        &self,
        id: RecordId,
        name: String,
        parent: &RecordId,
        transactions: &[&TransactionRecord],
        warnings: &mut Warnings,
    ) -> TreeNode {
        let mut total_amount = 0.0;
        let mut leaves = Vec::new();
        for tx in transactions {
            let amount = tx.absolute_amount().unwrap_or_else(|| {
                warnings.push(DataIntegrityWarning::UnparsableAmount {
                    transaction_id: tx.id.key(),
                    raw: tx.amount.raw(),
                });
                0.0
            });
            total_amount += amount;
            if self.include_transaction_leaves {
                leaves.push(transaction_leaf(tx, amount, &id, &name, warnings));
            }
        }
        sort_leaves(&mut leaves);

        TreeNode {
            id,
            name,
            parent: Some(parent.clone()),
            detail: NodeDetail::Vendor {
                transaction_count: transactions.len(),
                total_amount,
            },
            children: leaves,
        }
    }
}

/// Drop repeated transaction ids (first occurrence wins), one warning each
fn unique_transactions<'a>(
    transactions: &'a [TransactionRecord],
    warnings: &mut Warnings,
) -> Vec<&'a TransactionRecord> {
    let (unique, dropped) = dedup_by_id(transactions);
    for transaction_id in dropped {
        warnings.push(DataIntegrityWarning::DuplicateTransactionId { transaction_id });
    }
    unique
}

fn transaction_leaf(
    tx: &TransactionRecord,
    amount: f64,
    vendor_id: &RecordId,
    vendor_name: &str,
    warnings: &mut Warnings,
) -> TreeNode {
    let parsed_date = tx.parsed_date();
    if parsed_date.is_none() {
        warnings.push(DataIntegrityWarning::UnparsableDate {
            transaction_id: tx.id.key(),
            raw: tx.date.clone(),
        });
    }

    TreeNode {
        id: tx.id.clone(),
        name: tx.description_text().unwrap_or(vendor_name).to_string(),
        parent: Some(vendor_id.clone()),
        detail: NodeDetail::Transaction {
            amount,
            date: tx.date.clone(),
            parsed_date,
            direction: tx.direction.clone(),
            source: Box::new(tx.clone()),
        },
        children: Vec::new(),
    }
}

fn visit_categories_mut<F>(nodes: &mut [TreeNode], f: &mut F)
where
    F: FnMut(&mut TreeNode),
{
    for node in nodes.iter_mut().filter(|node| node.is_category()) {
        visit_categories_mut(&mut node.children, f);
        f(node);
    }
}

/// Categories keep source order ahead of vendors; vendors by descending total
fn sort_vendor_children(category: &mut TreeNode) {
    category.children.sort_by(|a, b| match (a.kind(), b.kind()) {
        (NodeKind::Vendor, NodeKind::Vendor) => b.total_amount().total_cmp(&a.total_amount()),
        (NodeKind::Vendor, _) => Ordering::Greater,
        (_, NodeKind::Vendor) => Ordering::Less,
        _ => Ordering::Equal,
    });
}

/// Newest first; unparsable dates last, in input order
fn sort_leaves(leaves: &mut [TreeNode]) {
    leaves.sort_by(|a, b| match (a.sort_date(), b.sort_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

// ============================================================================
// TESTS
// ============================================================================
