//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod display;
pub mod error;
pub mod output;

pub use args::{Cli, Commands};
pub use display::ForestDisplay;
pub use error::{CliError, CliResult};
