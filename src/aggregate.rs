// 📊 Aggregate calculator - recursive category spending totals
//
// total(c) = Σ |amount| of c's own transactions + Σ total(child) over c's
// direct child categories. Works from the flat records, so totals do not
// depend on any filtered view of the tree.

use crate::entities::{dedup_by_id, Category, TransactionRecord};
use crate::key::{canonical_key, RecordId};
use crate::warnings::{DataIntegrityWarning, Warnings};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// TOTALS REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct TotalsReport {
    /// Category key → recursive total
    pub totals: BTreeMap<String, f64>,
    pub warnings: Warnings,
}

// ============================================================================
// AGGREGATE CALCULATOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AggregateCalculator {
    /// Category key → Σ |amount| of its own transactions
    direct: HashMap<String, f64>,
    /// Category key → direct child category keys, source order
    children: HashMap<String, Vec<String>>,
    /// Every category key, source order
    order: Vec<String>,
    /// Problems found while indexing transactions
    warnings: Warnings,
}

impl AggregateCalculator {
    pub fn new(transactions: &[TransactionRecord], categories: &[Category]) -> Self {
        let mut warnings = Warnings::new();

        // Same rule as the vendor merger: first occurrence of an id counts
        let (unique, dropped) = dedup_by_id(transactions);
        for transaction_id in dropped {
            warnings.push(DataIntegrityWarning::DuplicateTransactionId { transaction_id });
        }

        let mut direct: HashMap<String, f64> = HashMap::new();
        for tx in unique {
            let Some(category_key) = tx.category_key() else {
                continue;
            };
            let amount = tx.absolute_amount().unwrap_or_else(|| {
                warnings.push(DataIntegrityWarning::UnparsableAmount {
                    transaction_id: tx.id.key(),
                    raw: tx.amount.raw(),
                });
                0.0
            });
            *direct.entry(category_key).or_insert(0.0) += amount;
        }

        // Same resolution as the tree builder: last occurrence of an id wins
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, &Category> = HashMap::new();
        for category in categories {
            let key = category.id.key();
            if latest.insert(key.clone(), category).is_none() {
                order.push(key);
            }
        }

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for key in &order {
            match latest[key].parent_key() {
                Some(parent) if parent == *key => {
                    warnings.push(DataIntegrityWarning::CycleDetected { id: key.clone() });
                }
                Some(parent) if latest.contains_key(&parent) => {
                    children.entry(parent).or_default().push(key.clone());
                }
                _ => {}
            }
        }

        AggregateCalculator {
            direct,
            children,
            order,
            warnings,
        }
    }

    /// Σ |amount| of the category's own transactions (no descendants)
    pub fn direct_total(&self, category_id: &RecordId) -> f64 {
        self.direct
            .get(&canonical_key(category_id))
            .copied()
            .unwrap_or(0.0)
    }

    /// Recursive total for one category; any revisit warnings are logged
    pub fn category_total(&self, category_id: &RecordId) -> f64 {
        let mut warnings = Warnings::new();
        self.category_total_with_warnings(category_id, &mut warnings)
    }

    /// Recursive total, collecting revisit warnings into `warnings`.
    ///
    /// A category reached twice in one walk contributes 0 the second time.
    pub fn category_total_with_warnings(&self, category_id: &RecordId, warnings: &mut Warnings) -> f64 {
        let key = canonical_key(category_id);
        let mut visited = HashSet::new();
        self.total_of(&key, &mut visited, warnings)
    }

    fn total_of<'a>(
        &'a self,
        key: &'a str,
        visited: &mut HashSet<&'a str>,
        warnings: &mut Warnings,
    ) -> f64 {
        if !visited.insert(key) {
            warnings.push_unique(DataIntegrityWarning::RevisitedCategory {
                category_id: key.to_string(),
            });
            return 0.0;
        }

        let own = self.direct.get(key).copied().unwrap_or(0.0);
        let descendants: f64 = self
            .children
            .get(key)
            .map(|kids| {
                kids.iter()
                    .map(|child| self.total_of(child, visited, warnings))
                    .sum::<f64>()
            })
            .unwrap_or(0.0);

        own + descendants
    }

    /// Totals for every category, plus every warning raised on the way
    pub fn totals(&self) -> TotalsReport {
        let mut warnings = self.warnings.clone();
        let mut totals = BTreeMap::new();
        for key in &self.order {
            let mut visited = HashSet::new();
            let total = self.total_of(key, &mut visited, &mut warnings);
            totals.insert(key.clone(), total);
        }
        TotalsReport { totals, warnings }
    }

    /// Warnings raised while indexing transactions and categories
    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }
}

// ============================================================================
// TESTS
// ============================================================================
