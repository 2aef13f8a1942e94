//! Bounded execution of external commands.

use anyhow::{anyhow, bail, Context};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Runs `program args..` and returns its stdout.
///
/// The child is killed if it does not finish within `limit`. A non-zero exit
/// status is an error carrying the command's stderr.
pub async fn run_with_timeout(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> anyhow::Result<String> {
    debug!("Running {} {:?} (timeout {:?})", program, args, limit);

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start {}", program))?;

    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| anyhow!("{} {:?} timed out after {:?}", program, args, limit))?
        .with_context(|| format!("failed to wait for {}", program))?;

    if !output.status.success() {
        bail!(
            "{} {:?} exited with {}: {}",
            program,
            args,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
