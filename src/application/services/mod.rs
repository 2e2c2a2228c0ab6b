//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CategoryStore) but are themselves
//! concrete structs, not traits.

mod reorder;

pub use reorder::{DragOutcome, PlannedMove, ReorderService};
