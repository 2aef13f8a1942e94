//! Parse command implementation.
//!
//! Runs the report parser over a saved `pmap -x` output.

use std::fs;
use std::io::Read;
use std::path::Path;

use pmap_stats::analyze_process;
use pmap_stats::output::{render_process_totals, render_summary};

use crate::config::Config;
use crate::process::report_body;

/// Analyzes a saved report and prints the result.
pub fn command_parse(
    file: &Path,
    pid: &str,
    json: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(file)
            .map_err(|e| format!("cannot read report {}: {}", file.display(), e))?
    };

    let report = analyze_process(
        pid,
        report_body(&text, config.header_lines()),
        config.average_divisor(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_summary(&report));
        print!("{}", render_process_totals(&report));
    }
    Ok(())
}
