// 🌳 Tree model - categories, vendors, and transaction leaves
//
// A node is one of three kinds. Kind-specific fields live in `NodeDetail`
// and are flattened next to the common fields when serialized:
//
//   {"id": 2, "name": "Restaurants", "kind": "category", "parent": 1,
//    "isCustom": true, "children": [...]}

use crate::entities::TransactionRecord;
use crate::key::{canonical_key, RecordId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// NODE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Vendor,
    Transaction,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Category => "category",
            NodeKind::Vendor => "vendor",
            NodeKind::Transaction => "transaction",
        }
    }

    /// Only categories can be reparented
    pub fn is_movable(&self) -> bool {
        matches!(self, NodeKind::Category)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "category" => Ok(NodeKind::Category),
            "vendor" => Ok(NodeKind::Vendor),
            "transaction" => Ok(NodeKind::Transaction),
            other => Err(format!("Unknown node kind: {}", other)),
        }
    }
}

// ============================================================================
// NODE REFERENCE
// ============================================================================

/// (id, kind) pair: unique across a whole tree, and the identity callers
/// key their own presentation state by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: RecordId,
    pub kind: NodeKind,
}

impl NodeRef {
    pub fn new(id: impl Into<RecordId>, kind: NodeKind) -> Self {
        NodeRef { id: id.into(), kind }
    }

    pub fn category(id: impl Into<RecordId>) -> Self {
        NodeRef::new(id, NodeKind::Category)
    }

    pub fn key(&self) -> String {
        canonical_key(&self.id)
    }
}

// ============================================================================
// NODE DETAIL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeDetail {
    Category {
        #[serde(rename = "isCustom")]
        is_custom: bool,
        #[serde(rename = "ownerId", skip_serializing_if = "Option::is_none")]
        owner_id: Option<RecordId>,
    },
    Vendor {
        #[serde(rename = "transactionCount")]
        transaction_count: usize,
        /// Sum of absolute amounts
        #[serde(rename = "totalAmount")]
        total_amount: f64,
    },
    Transaction {
        /// Absolute value of the source amount
        amount: f64,
        /// Date text as imported
        date: String,
        #[serde(skip)]
        parsed_date: Option<NaiveDateTime>,
        direction: String,
        source: Box<TransactionRecord>,
    },
}

// ============================================================================
// TREE NODE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: RecordId,
    pub name: String,

    /// Id of the containing node; `None` only for roots
    pub parent: Option<RecordId>,

    #[serde(flatten)]
    pub detail: NodeDetail,

    /// Empty for transaction leaves
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self.detail {
            NodeDetail::Category { .. } => NodeKind::Category,
            NodeDetail::Vendor { .. } => NodeKind::Vendor,
            NodeDetail::Transaction { .. } => NodeKind::Transaction,
        }
    }

    pub fn key(&self) -> String {
        canonical_key(&self.id)
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id.clone(),
            kind: self.kind(),
        }
    }

    pub fn is_category(&self) -> bool {
        self.kind() == NodeKind::Category
    }

    /// System categories cannot receive dropped children
    pub fn is_protected(&self) -> bool {
        matches!(self.detail, NodeDetail::Category { is_custom: false, .. })
    }

    pub fn matches(&self, key: &str, kind: Option<NodeKind>) -> bool {
        kind.map_or(true, |k| k == self.kind()) && self.key() == key
    }

    /// Vendor total, 0 for other kinds
    pub fn total_amount(&self) -> f64 {
        match self.detail {
            NodeDetail::Vendor { total_amount, .. } => total_amount,
            _ => 0.0,
        }
    }

    /// Transaction date, `None` for other kinds or unparsable dates
    pub fn sort_date(&self) -> Option<NaiveDateTime> {
        match self.detail {
            NodeDetail::Transaction { parsed_date, .. } => parsed_date,
            _ => None,
        }
    }

    /// Copy of this node carrying a different child list
    pub fn with_children(&self, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: self.id.clone(),
            name: self.name.clone(),
            parent: self.parent.clone(),
            detail: self.detail.clone(),
            children,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str, parent: Option<i64>, is_custom: bool) -> TreeNode {
        TreeNode {
            id: RecordId::from(id),
            name: name.to_string(),
            parent: parent.map(RecordId::from),
            detail: NodeDetail::Category { is_custom, owner_id: None },
            children: Vec::new(),
        }
    }

    #[test]
    fn test_category_serialization_shape() {
        let mut food = category(1, "Food", None, false);
        food.children.push(category(2, "Restaurants", Some(1), true));

        let json = serde_json::to_value(&food).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["kind"], "category");
        assert!(json["parent"].is_null());
        assert_eq!(json["isCustom"], false);
        assert_eq!(json["children"][0]["parent"], 1);
        assert_eq!(json["children"][0]["name"], "Restaurants");
    }

    #[test]
    fn test_vendor_serialization_shape() {
        let vendor = TreeNode {
            id: RecordId::from("v1"),
            name: "Shell".to_string(),
            parent: Some(RecordId::from(1)),
            detail: NodeDetail::Vendor { transaction_count: 2, total_amount: 80.5 },
            children: Vec::new(),
        };

        let json = serde_json::to_value(&vendor).unwrap();
        assert_eq!(json["kind"], "vendor");
        assert_eq!(json["transactionCount"], 2);
        assert_eq!(json["totalAmount"], 80.5);
        assert_eq!(vendor.total_amount(), 80.5);
    }

    #[test]
    fn test_protection_and_matching() {
        let system = category(1, "Food", None, false);
        let custom = category(2, "Snacks", None, true);

        assert!(system.is_protected());
        assert!(!custom.is_protected());
        assert!(custom.matches("2", Some(NodeKind::Category)));
        assert!(custom.matches("2", None));
        assert!(!custom.matches("2", Some(NodeKind::Vendor)));
    }

    #[test]
    fn test_node_kind_parsing() {
        assert_eq!("Vendor".parse::<NodeKind>(), Ok(NodeKind::Vendor));
        assert!("folder".parse::<NodeKind>().is_err());
        assert!(NodeKind::Category.is_movable());
        assert!(!NodeKind::Transaction.is_movable());
    }
}
