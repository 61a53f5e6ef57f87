// 🏷️ Category record - flat input row for the category forest
//
// A category is either system-defined (protected: cannot be renamed,
// deleted, or receive dropped children) or user-defined (`isCustom`).

use crate::key::RecordId;
use serde::{Deserialize, Serialize};

// ============================================================================
// CATEGORY RECORD
// ============================================================================

/// One category as delivered by the source store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Opaque id (number or string in source data)
    pub id: RecordId,

    /// Display name (e.g., "Restaurants")
    pub name: String,

    /// Declared parent category; `None` for roots
    #[serde(default, rename = "parent", alias = "parentId")]
    pub parent_id: Option<RecordId>,

    /// `false` marks a system (protected) category
    #[serde(default)]
    pub is_custom: bool,

    /// Owning user for custom categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<RecordId>,
}

impl Category {
    /// User-defined category
    pub fn custom(id: impl Into<RecordId>, name: &str, parent_id: Option<RecordId>) -> Self {
        Category {
            id: id.into(),
            name: name.to_string(),
            parent_id,
            is_custom: true,
            owner_id: None,
        }
    }

    /// Built-in, protected category
    pub fn system(id: impl Into<RecordId>, name: &str, parent_id: Option<RecordId>) -> Self {
        Category {
            is_custom: false,
            ..Category::custom(id, name, parent_id)
        }
    }

    pub fn is_system(&self) -> bool {
        !self.is_custom
    }

    /// Check if this is a root category (no declared parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Canonical key of the declared parent, if any
    pub fn parent_key(&self) -> Option<String> {
        self.parent_id.as_ref().map(RecordId::key)
    }
}

// ============================================================================
// TESTS
// ============================================================================
