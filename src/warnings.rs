// ⚠️ Data integrity warnings - non-fatal problems found while building
//
// A bad record never aborts a build. It is skipped or defaulted, and a
// warning describing what happened travels back next to the result.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

// ============================================================================
// WARNING KINDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DataIntegrityWarning {
    #[error("duplicate category id {id}: last occurrence wins")]
    DuplicateCategoryId { id: String },

    #[error("category {id} declares missing parent {parent}: promoted to root")]
    OrphanedCategory { id: String, parent: String },

    #[error("category {id} is part of a parent cycle: promoted to root")]
    CycleDetected { id: String },

    #[error("vendor {vendor_id} references unknown category {parent}: dropped")]
    OrphanedVendor { vendor_id: String, parent: String },

    #[error("vendor {vendor_id} appears more than once: later record dropped")]
    DuplicateVendorId { vendor_id: String },

    #[error("transaction {transaction_id} has unparsable amount {raw:?}: treated as 0")]
    UnparsableAmount { transaction_id: String, raw: String },

    #[error("transaction {transaction_id} has unparsable date {raw:?}: sorted last")]
    UnparsableDate { transaction_id: String, raw: String },

    #[error("transaction id {transaction_id} repeats: later record dropped")]
    DuplicateTransactionId { transaction_id: String },

    #[error("transaction {transaction_id} in category {category} names vendor {vendor_id} of another category: not attached")]
    MismatchedVendorCategory {
        transaction_id: String,
        vendor_id: String,
        category: String,
    },

    #[error("transaction {transaction_id} has no category")]
    UnassignedTransaction { transaction_id: String },

    #[error("category {category_id} revisited while totaling: contributes 0")]
    RevisitedCategory { category_id: String },
}

impl DataIntegrityWarning {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataIntegrityWarning::DuplicateCategoryId { .. } => "duplicate_category_id",
            DataIntegrityWarning::OrphanedCategory { .. } => "orphaned_category",
            DataIntegrityWarning::CycleDetected { .. } => "cycle_detected",
            DataIntegrityWarning::OrphanedVendor { .. } => "orphaned_vendor",
            DataIntegrityWarning::DuplicateVendorId { .. } => "duplicate_vendor_id",
            DataIntegrityWarning::UnparsableAmount { .. } => "unparsable_amount",
            DataIntegrityWarning::UnparsableDate { .. } => "unparsable_date",
            DataIntegrityWarning::DuplicateTransactionId { .. } => "duplicate_transaction_id",
            DataIntegrityWarning::MismatchedVendorCategory { .. } => "mismatched_vendor_category",
            DataIntegrityWarning::UnassignedTransaction { .. } => "unassigned_transaction",
            DataIntegrityWarning::RevisitedCategory { .. } => "revisited_category",
        }
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

/// Ordered collection of warnings returned alongside build results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Warnings(Vec<DataIntegrityWarning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it as a structured log event
    pub fn push(&mut self, warning: DataIntegrityWarning) {
        warn!(kind = warning.kind_name(), "{}", warning);
        self.0.push(warning);
    }

    /// Record a warning unless an identical one is already present
    pub fn push_unique(&mut self, warning: DataIntegrityWarning) {
        if !self.0.contains(&warning) {
            self.push(warning);
        }
    }

    /// Merge warnings collected elsewhere (already logged there)
    pub fn extend(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of warnings of one kind (see [`DataIntegrityWarning::kind_name`])
    pub fn count_of(&self, kind_name: &str) -> usize {
        self.0.iter().filter(|w| w.kind_name() == kind_name).count()
    }
}

// ============================================================================
// TESTS
// ============================================================================
