//! Process id discovery.

use std::time::Duration;
use tracing::{info, warn};

use super::command::run_with_timeout;

/// Splits `pidof` output into PID strings, keeping their order.
pub fn parse_pid_list(output: &str) -> Vec<String> {
    output
        .split_whitespace()
        .filter(|s| s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

/// Resolves every PID of `program` with `pidof`.
///
/// `pidof` exits with status 1 when nothing matches; that case, like any
/// other failure, is logged and yields an empty list.
pub async fn find_pids(pidof: &str, program: &str, limit: Duration) -> Vec<String> {
    match run_with_timeout(pidof, &[program], limit).await {
        Ok(out) => {
            let pids = parse_pid_list(&out);
            info!("Found {} process(es) for '{}': {:?}", pids.len(), program, pids);
            pids
        }
        Err(e) => {
            warn!("No processes found for '{}': {:#}", program, e);
            Vec::new()
        }
    }
}
