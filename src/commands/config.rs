//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("pmap-stats.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# pmap-stats Configuration
# ========================
#
# Output
# ------
# output_dir: "pmap-stats-out"  # One run<N>/ directory per run is created here
# output_format: text           # text | json
# write_mapping_rows: true      # Write <pid>.txt with one row per mapping
# keep_raw_reports: false       # Keep raw pmap output under run<N>/raw/
#
# Collection
# ----------
# runs: 1                       # Repeat PID discovery + capture N times
# command_timeout_secs: 10      # Kill pidof / pmap after N seconds
# pmap_command: "pmap"
# pidof_command: "pidof"
#
# Parsing
# -------
# header_lines: 2               # Lines skipped at the top of each report
# average_divisor: last-index   # last-index (mappings - 1) | mapping-count
#
# Logging
# -------
# log_level: "info"             # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
