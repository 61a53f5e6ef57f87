// ↔️ Tree mutator - legality of drag-and-drop reparenting
//
// Validation only: nothing here edits a tree. A legal verdict is handed to
// the persistence layer, and the tree is rebuilt from source data once the
// write lands. Right before committing, the caller re-checks the verdict
// against the freshest tree with `confirm_at_commit`.

use crate::key::RecordId;
use crate::navigator::TreeNavigator;
use crate::tree::{NodeKind, NodeRef, TreeNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// DROP POSITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
    Root,
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Inside => "inside",
            DropPosition::Root => "root",
        };
        f.write_str(s)
    }
}

impl FromStr for DropPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" => Ok(DropPosition::Before),
            "after" => Ok(DropPosition::After),
            "inside" => Ok(DropPosition::Inside),
            "root" => Ok(DropPosition::Root),
            other => Err(format!("Unknown drop position: {}", other)),
        }
    }
}

// ============================================================================
// REQUEST / VERDICT / ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub dragged: NodeRef,
    /// Ignored for `root` drops
    pub target: NodeRef,
    pub position: DropPosition,
}

/// A legal move and where the dragged category would land
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveVerdict {
    pub dragged: NodeRef,
    pub position: DropPosition,
    /// `None` when the category becomes a root
    pub new_parent: Option<RecordId>,
}

impl MoveVerdict {
    fn lands_under_same_parent(&self, other: &MoveVerdict) -> bool {
        match (&self.new_parent, &other.new_parent) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum MoveError {
    #[error("only categories can be moved, not a {kind}")]
    InvalidKind { kind: NodeKind },

    #[error("category {id} cannot be dropped onto itself")]
    SelfDrop { id: String },

    #[error("{id} cannot receive child categories")]
    InvalidTarget { id: String },

    #[error("moving {dragged} under {target} would create a cycle")]
    CircularDependency { dragged: String, target: String },

    #[error("{id} is no longer in the current tree")]
    StaleTarget { id: String },
}

// ============================================================================
// TREE MUTATOR
// ============================================================================

pub struct TreeMutator<'t> {
    nav: TreeNavigator<'t>,
}

impl<'t> TreeMutator<'t> {
    pub fn new(roots: &'t [TreeNode]) -> Self {
        TreeMutator {
            nav: TreeNavigator::new(roots),
        }
    }

    /// Decide whether `dragged` may be dropped at `position` relative to
    /// `target`. Checks run in a fixed order: movable kind, root drop,
    /// self drop, target presence, target eligibility, cycles.
    pub fn validate_move(
        &self,
        dragged: &NodeRef,
        target: &NodeRef,
        position: DropPosition,
    ) -> Result<MoveVerdict, MoveError> {
        if !dragged.kind.is_movable() {
            return Err(MoveError::InvalidKind { kind: dragged.kind });
        }

        if position == DropPosition::Root {
            return Ok(MoveVerdict {
                dragged: dragged.clone(),
                position,
                new_parent: None,
            });
        }

        let dragged_key = dragged.key();
        let target_key = target.key();
        if dragged_key == target_key {
            return Err(MoveError::SelfDrop { id: dragged_key });
        }

        let target_node = self
            .nav
            .find_by_key(&target_key, Some(target.kind))
            .ok_or_else(|| MoveError::StaleTarget { id: target_key.clone() })?;
        let dragged_node = self
            .nav
            .find_by_key(&dragged_key, Some(NodeKind::Category))
            .ok_or_else(|| MoveError::StaleTarget { id: dragged_key.clone() })?;

        let new_parent = match position {
            DropPosition::Inside => {
                if !target_node.is_category() || target_node.is_protected() {
                    return Err(MoveError::InvalidTarget { id: target_key });
                }
                Some(target_node.id.clone())
            }
            _ => self.enclosing_category(target_node),
        };

        // The new parent must not sit inside the dragged subtree
        if let Some(parent) = &new_parent {
            let parent_key = parent.key();
            let in_subtree = parent_key == dragged_key
                || TreeNavigator::new(&dragged_node.children)
                    .find_by_key(&parent_key, Some(NodeKind::Category))
                    .is_some();
            if in_subtree {
                return Err(MoveError::CircularDependency {
                    dragged: dragged_key,
                    target: target_key,
                });
            }
        }

        debug!(dragged = %dragged_key, target = %target_key, %position, "move is legal");
        Ok(MoveVerdict {
            dragged: dragged.clone(),
            position,
            new_parent,
        })
    }

    pub fn validate(&self, request: &MoveRequest) -> Result<MoveVerdict, MoveError> {
        self.validate_move(&request.dragged, &request.target, request.position)
    }

    /// Category a before/after drop lands in: the target's parent, or for a
    /// transaction leaf its vendor's parent. `None` for root-level targets.
    fn enclosing_category(&self, target: &TreeNode) -> Option<RecordId> {
        match target.kind() {
            NodeKind::Category | NodeKind::Vendor => target.parent.clone(),
            NodeKind::Transaction => {
                let vendor = self
                    .nav
                    .find_node(target.parent.as_ref()?, Some(NodeKind::Vendor))?;
                vendor.parent.clone()
            }
        }
    }
}

/// Re-run validation against the latest tree right before committing.
///
/// Fails with `StaleTarget` when either node vanished or the move would now
/// land under a different parent than the verdict the caller acted on.
pub fn confirm_at_commit(
    latest: &[TreeNode],
    request: &MoveRequest,
    verdict: &MoveVerdict,
) -> Result<MoveVerdict, MoveError> {
    let nav = TreeNavigator::new(latest);
    let dragged_key = request.dragged.key();
    if nav.find_by_key(&dragged_key, Some(request.dragged.kind)).is_none() {
        return Err(MoveError::StaleTarget { id: dragged_key });
    }

    let fresh = TreeMutator::new(latest).validate(request)?;
    if !fresh.lands_under_same_parent(verdict) {
        return Err(MoveError::StaleTarget { id: request.target.key() });
    }
    Ok(fresh)
}

// ============================================================================
// TESTS
// ============================================================================
