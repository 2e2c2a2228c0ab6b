//! Domain layer: category forest and the reorder engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod mutator;
pub mod order;
pub mod resolver;

pub use arena::{Forest, NodeView, Visit};
pub use entities::*;
pub use error::{DomainError, TreeResult};
