//! Structural moves: remove-then-reinsert over detached groups.

use tracing::debug;

use crate::domain::arena::Forest;
use crate::domain::entities::CategoryId;
use crate::domain::error::{DomainError, TreeResult};

/// Move `dragged` under `new_parent` (top level when `None`), appended last.
///
/// Pure: the input forest is left untouched and a structurally distinct forest
/// is returned. Order values are carried over as-is; stamp them afterwards with
/// [`crate::domain::order::assign`].
///
/// Runs in two passes: first every group is detached with the dragged
/// category collected out of it, then a fresh arena is built from the groups
/// with the dragged category re-inserted at its destination.
pub fn apply(
    forest: &Forest,
    dragged: CategoryId,
    new_parent: Option<CategoryId>,
) -> TreeResult<Forest> {
    if !forest.contains(dragged) {
        return Err(DomainError::UnknownNode(dragged));
    }

    if let Some(parent) = new_parent {
        if !forest.contains(parent) {
            return Err(DomainError::UnknownParent(parent));
        }
        if parent == dragged || forest.has_children(dragged) || !forest.is_top_level(parent) {
            return Err(DomainError::InvalidReparent {
                id: dragged,
                target: parent,
            });
        }
    }

    // Pass 1: collect
    let mut moved = None;
    let mut groups = Vec::with_capacity(forest.roots().len());
    for (root, children) in forest.groups() {
        if root.id == dragged {
            moved = Some((root, children));
            continue;
        }
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            if child.id == dragged {
                moved = Some((child, Vec::new()));
            } else {
                kept.push(child);
            }
        }
        groups.push((root, kept));
    }
    let (category, children) = moved.ok_or(DomainError::UnknownNode(dragged))?;

    // Pass 2: rebuild
    match new_parent {
        None => groups.push((category, children)),
        Some(parent) => {
            let group = groups
                .iter_mut()
                .find(|(root, _)| root.id == parent)
                .ok_or(DomainError::UnknownParent(parent))?;
            group.1.push(category);
        }
    }

    debug!(dragged, ?new_parent, "applied move");
    Ok(Forest::from_groups(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CategoryNode;

    fn forest() -> Forest {
        Forest::from_nodes(&[
            CategoryNode::new(1, "A").with_children(vec![
                CategoryNode::new(2, "A1"),
                CategoryNode::new(4, "A2"),
            ]),
            CategoryNode::new(3, "B"),
        ])
        .unwrap()
    }

    #[test]
    fn given_child_when_promoted_then_appended_to_top_level() {
        let next = apply(&forest(), 2, None).unwrap();
        assert_eq!(next.roots(), vec![1, 3, 2]);
        assert_eq!(next.children_of(1), vec![4]);
    }

    #[test]
    fn given_top_level_parent_with_children_when_moved_to_top_level_then_children_travel_along() {
        let next = apply(&forest(), 1, None).unwrap();
        assert_eq!(next.roots(), vec![3, 1]);
        assert_eq!(next.children_of(1), vec![2, 4]);
    }

    #[test]
    fn given_self_as_parent_when_applying_then_invalid_reparent() {
        assert_eq!(
            apply(&forest(), 3, Some(3)).unwrap_err(),
            DomainError::InvalidReparent { id: 3, target: 3 }
        );
    }

    #[test]
    fn given_child_as_parent_when_applying_then_invalid_reparent() {
        assert_eq!(
            apply(&forest(), 3, Some(2)).unwrap_err(),
            DomainError::InvalidReparent { id: 3, target: 2 }
        );
    }

    #[test]
    fn given_sibling_drop_when_applying_then_moved_to_end_of_same_group() {
        let next = apply(&forest(), 2, Some(1)).unwrap();
        assert_eq!(next.children_of(1), vec![4, 2]);
    }
}
