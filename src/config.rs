// ⚙️ Configuration - build flags and runtime locations
//
// Defaults suit the common case (everything visible, no transaction
// leaves); each field can be overridden from the environment.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_INCLUDE_SYSTEM: &str = "CATEGORY_TREE_INCLUDE_SYSTEM";
pub const ENV_INCLUDE_USER: &str = "CATEGORY_TREE_INCLUDE_USER";
pub const ENV_TRANSACTION_LEAVES: &str = "CATEGORY_TREE_TRANSACTION_LEAVES";
pub const ENV_SNAPSHOT: &str = "CATEGORY_TREE_SNAPSHOT";
pub const ENV_ADDR: &str = "CATEGORY_TREE_ADDR";

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Show system (protected) categories
    #[serde(default = "default_true")]
    pub include_system: bool,

    /// Show user-defined categories
    #[serde(default = "default_true")]
    pub include_user: bool,

    /// Attach each transaction as a leaf under its vendor
    #[serde(default)]
    pub include_transaction_leaves: bool,

    /// JSON snapshot of categories / transactions / vendors
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Server bind address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            include_system: true,
            include_user: true,
            include_transaction_leaves: false,
            snapshot_path: None,
            listen_addr: default_listen_addr(),
        }
    }
}

impl TreeConfig {
    /// Defaults overlaid with `CATEGORY_TREE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = TreeConfig::default();

        if let Some(value) = lookup(ENV_INCLUDE_SYSTEM) {
            config.include_system = parse_flag(ENV_INCLUDE_SYSTEM, &value)?;
        }
        if let Some(value) = lookup(ENV_INCLUDE_USER) {
            config.include_user = parse_flag(ENV_INCLUDE_USER, &value)?;
        }
        if let Some(value) = lookup(ENV_TRANSACTION_LEAVES) {
            config.include_transaction_leaves = parse_flag(ENV_TRANSACTION_LEAVES, &value)?;
        }
        if let Some(value) = lookup(ENV_SNAPSHOT).filter(|v| !v.trim().is_empty()) {
            config.snapshot_path = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = lookup(ENV_ADDR).filter(|v| !v.trim().is_empty()) {
            config.listen_addr = value.trim().to_string();
        }

        Ok(config)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean, got {:?}", name, other),
    }
}

// ============================================================================
// TESTS
// ============================================================================
