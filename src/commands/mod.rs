//! CLI command implementations for pmap-stats.
//!
//! This module provides implementations for all CLI subcommands:
//! - `analyze`: Capture and analyze every process of a program
//! - `parse`: Analyze a saved report file
//! - `config`: Configuration file generation
//! - `check`: Configuration and tool validation

pub mod analyze;
pub mod check;
pub mod config;
pub mod parse;

// Re-export command functions
pub use analyze::command_analyze;
pub use check::command_check;
pub use config::command_config;
pub use parse::command_parse;
