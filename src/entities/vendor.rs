// 🏪 Vendor records and description → vendor name mapping
//
// Vendors come from two places: an external vendor list (each record names
// its parent category) or name mappings that fold raw bank descriptions
// ("STARBUCKS #4521") into one display name ("Starbucks").

use crate::key::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vendor name used when a transaction carries no description at all
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

// ============================================================================
// VENDOR RECORD
// ============================================================================

/// Externally supplied vendor, attached under its parent category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: RecordId,
    pub name: String,

    /// Parent category id; may be typed differently than the category's own id
    #[serde(default, alias = "parentId", alias = "categoryId")]
    pub parent: Option<RecordId>,
}

impl VendorRecord {
    pub fn new(id: impl Into<RecordId>, name: &str, parent: impl Into<RecordId>) -> Self {
        VendorRecord {
            id: id.into(),
            name: name.to_string(),
            parent: Some(parent.into()),
        }
    }
}

// ============================================================================
// NAME MAPPING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMapping {
    /// Raw description as imported
    pub original_name: String,

    /// Vendor name to display instead
    pub mapped_name: String,
}

/// Lookup table from original description to mapped vendor name.
///
/// Later mappings for the same description replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct NameMappingTable {
    mappings: HashMap<String, String>,
}

impl NameMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: &[NameMapping]) -> Self {
        let mut table = NameMappingTable::new();
        for mapping in mappings {
            table.add_mapping(mapping);
        }
        table
    }

    pub fn add_mapping(&mut self, mapping: &NameMapping) {
        let mapped = mapping.mapped_name.trim();
        if mapped.is_empty() {
            return;
        }
        self.mappings
            .insert(mapping.original_name.trim().to_string(), mapped.to_string());
    }

    /// Mapped name for an original description
    pub fn resolve(&self, description: &str) -> Option<&str> {
        self.mappings.get(description.trim()).map(String::as_str)
    }

    /// Effective vendor name: mapping, else the description, else
    /// [`UNKNOWN_VENDOR`].
    pub fn effective_name(&self, description: Option<&str>) -> String {
        match description.map(str::trim).filter(|d| !d.is_empty()) {
            Some(desc) => self.resolve(desc).unwrap_or(desc).to_string(),
            None => UNKNOWN_VENDOR.to_string(),
        }
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
