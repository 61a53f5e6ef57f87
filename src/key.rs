// 🔑 Record identity - opaque ids and the one canonical lookup key
//
// Source records arrive with ids that are sometimes JSON numbers and
// sometimes strings ("1" vs 1). Every map in this crate is keyed by
// `canonical_key`, so a vendor whose parent is "1" finds category 1 without
// any per-call-site coercion.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// RECORD ID
// ============================================================================

/// Opaque, comparable identifier as it appears in source data.
///
/// The original representation is preserved for output; comparisons across
/// records always go through [`RecordId::key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(serde_json::Number),
    Text(String),
}

impl RecordId {
    /// Canonical lookup key for this id
    pub fn key(&self) -> String {
        canonical_key(self)
    }

    /// True when both ids normalize to the same key
    pub fn same_as(&self, other: &RecordId) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value.into())
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        RecordId::Number(value.into())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Largest integer magnitude an f64 represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Normalize an id to the key used by every lookup in the crate.
///
/// Numbers and numeric strings collapse to the same decimal form
/// (`1`, `"1"`, `"1.0"`, `" 1 "` → `"1"`); anything else is the trimmed text.
pub fn canonical_key(id: &RecordId) -> String {
    match id {
        RecordId::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64()
                    .map(canonical_float)
                    .unwrap_or_else(|| n.to_string())
            }
        }
        RecordId::Text(s) => canonical_text(s),
    }
}

/// Normalize a raw textual id (command-line arguments, query strings).
pub fn canonical_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => canonical_float(value),
        _ => trimmed.to_string(),
    }
}

fn canonical_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        // Also folds -0 into 0
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// TESTS
// ============================================================================
