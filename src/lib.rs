//! Drag-and-drop reorder engine for a two-level category tree.
//!
//! Layers, innermost first: `domain` (forest, resolver, mutator, order
//! assigner), `application` (reorder service, background sync),
//! `infrastructure` (HTTP store, session, wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
