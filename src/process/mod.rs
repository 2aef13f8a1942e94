//! External collaborators that produce raw reports.
//!
//! This module provides:
//! - `command`: running an external tool with a timeout
//! - `pids`: process id discovery via `pidof`
//! - `pmap`: capturing `pmap -x` reports

pub mod command;
pub mod pids;
pub mod pmap;

// Re-export commonly used types
pub use pids::{find_pids, parse_pid_list};
pub use pmap::{capture_report, report_body};
