// 📦 Source snapshot - the flat records a tree is rebuilt from
//
// The tree is never persisted; every change to source data means loading a
// fresh snapshot and rebuilding wholesale.

use crate::entities::{Category, NameMapping, NameMappingTable, TransactionRecord, VendorRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,

    /// External vendors; categories without any fall back to synthesis
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,

    #[serde(default)]
    pub name_mappings: Vec<NameMapping>,
}

impl SourceSnapshot {
    /// Load snapshot from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to load snapshot: {:?}", path.as_ref()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot JSON")
    }

    pub fn name_table(&self) -> NameMappingTable {
        NameMappingTable::from_mappings(&self.name_mappings)
    }
}

// ============================================================================
// TESTS
// ============================================================================
