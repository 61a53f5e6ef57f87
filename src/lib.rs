// Category Tree - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod key;        // Record ids and canonical lookup keys
pub mod entities;   // Flat source records: categories, transactions, vendors
pub mod warnings;   // Data integrity warnings raised while building
pub mod tree;       // Node model shared by every stage
pub mod builder;    // Flat categories → forest
pub mod vendors;    // Vendor layer: external attach + synthesis
pub mod navigator;  // Lookups over a built forest
pub mod filter;     // Search / visible-id views
pub mod mutation;   // Drag-and-drop move validation
pub mod aggregate;  // Recursive spending totals
pub mod config;
pub mod snapshot;
pub mod pipeline;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use key::{canonical_key, canonical_text, RecordId};
pub use entities::{
    Category,
    TransactionRecord, RawAmount, parse_date,
    VendorRecord, NameMapping, NameMappingTable, UNKNOWN_VENDOR,
};
pub use warnings::{DataIntegrityWarning, Warnings};
pub use tree::{NodeDetail, NodeKind, NodeRef, TreeNode};
pub use builder::{build_category_tree, BuildOutcome, CategoryTreeBuilder};
pub use vendors::{synthesized_vendor_id, VendorMerger};
pub use navigator::{TreeNavigator, Walk};
pub use filter::{filter_tree, FilterQuery};
pub use mutation::{
    confirm_at_commit, DropPosition, MoveError, MoveRequest, MoveVerdict, TreeMutator,
};
pub use aggregate::{AggregateCalculator, TotalsReport};
pub use config::TreeConfig;
pub use snapshot::SourceSnapshot;
pub use pipeline::{build_tree, compute_totals, TreeBuild};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
