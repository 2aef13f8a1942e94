//! Capturing `pmap -x` reports.

use anyhow::Context;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::command::run_with_timeout;

/// Unparsed `pmap -x` output of one process.
#[derive(Debug, Clone)]
pub struct RawReport {
    pub pid: String,
    pub text: String,
}

impl RawReport {
    /// Saves the raw text as `<dir>/<pid>.pmap`.
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        let path = dir.join(format!("{}.pmap", self.pid));
        fs::write(&path, &self.text)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }
}

/// Runs `<pmap> -x <pid>`.
pub async fn capture_report(pmap: &str, pid: &str, limit: Duration) -> anyhow::Result<RawReport> {
    let text = run_with_timeout(pmap, &["-x", pid], limit)
        .await
        .with_context(|| format!("cannot capture memory map of pid {}", pid))?;
    debug!("Captured {} bytes of pmap output for pid {}", text.len(), pid);
    Ok(RawReport {
        pid: pid.to_string(),
        text,
    })
}

/// Body lines of a report: everything after the header lines.
pub fn report_body(text: &str, header_lines: usize) -> impl Iterator<Item = &str> {
    text.lines().skip(header_lines)
}
