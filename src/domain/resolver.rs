//! Drop-target resolution: decides the new parent of a dragged category.

use tracing::debug;

use crate::domain::arena::Forest;
use crate::domain::entities::{CategoryId, DropTarget};
use crate::domain::error::{DomainError, TreeResult};

/// Resolve the parent the dragged category ends up under.
///
/// Returns `None` for the top level. Rules:
/// - `Container(p)`: `p`, which must be a top-level category.
/// - `Node(t)` with `t` top-level: `t`.
/// - `Node(t)` with `t` a child: `t`'s parent, making the dragged node a sibling of `t`.
/// - `TopLevel`: `None`.
/// - the dragged node's own row or zone: its current parent.
///
/// A category that has children can only stay at the top level; any other
/// outcome is `InvalidReparent`.
pub fn resolve(
    dragged: CategoryId,
    target: &DropTarget,
    forest: &Forest,
) -> TreeResult<Option<CategoryId>> {
    let entry = forest
        .entry(dragged)
        .ok_or(DomainError::UnknownNode(dragged))?;
    let current = entry.parent_id;

    let new_parent = match *target {
        DropTarget::TopLevel => None,
        DropTarget::Node(id) | DropTarget::Container(id) if id == dragged => return Ok(current),
        DropTarget::Container(id) => {
            if !forest.is_top_level(id) {
                return Err(DomainError::UnknownParent(id));
            }
            Some(id)
        }
        DropTarget::Node(id) => {
            let over = forest.entry(id).ok_or(DomainError::UnknownParent(id))?;
            Some(over.parent_id.unwrap_or(id))
        }
    };

    if let Some(parent) = new_parent {
        if forest.has_children(dragged) {
            return Err(DomainError::InvalidReparent {
                id: dragged,
                target: parent,
            });
        }
    }

    debug!(dragged, drop = %target, ?current, ?new_parent, "resolved drop");
    Ok(new_parent)
}
