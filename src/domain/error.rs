//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::CategoryId;

/// Domain errors represent tree-shape violations.
/// They are detected before any mutation, so the forest they refer to is never changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("category {id} cannot be placed under {target}: nesting is limited to two levels")]
    InvalidReparent { id: CategoryId, target: CategoryId },

    #[error("unknown parent category: {0}")]
    UnknownParent(CategoryId),

    #[error("unknown category: {0}")]
    UnknownNode(CategoryId),

    #[error("duplicate category id: {0}")]
    DuplicateId(CategoryId),

    #[error("category {id} is nested below child {parent}")]
    DepthExceeded { id: CategoryId, parent: CategoryId },

    #[error("category {id} declares parent {declared:?} but is stored under {actual:?}")]
    ParentMismatch {
        id: CategoryId,
        declared: Option<CategoryId>,
        actual: Option<CategoryId>,
    },

    #[error("invalid drop target: {0}")]
    InvalidDropTarget(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
