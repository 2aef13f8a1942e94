//! Check command implementation.
//!
//! Validates configuration and the external tools the analyzer depends on.

use std::time::Duration;

use pmap_stats::analyze_process;

use crate::config::{validate_effective_config, Config};
use crate::process::command::run_with_timeout;
use crate::process::{capture_report, parse_pid_list, report_body};

/// Validates configuration and tool availability.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 pmap-stats - System Check");
    println!("============================");

    let mut all_ok = true;
    let limit = Duration::from_secs(config.command_timeout_secs());

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    // Check pidof against our own executable name
    println!("\n📁 Checking {}...", config.pidof_command());
    let own_name = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "pmap-stats".to_string());
    match run_with_timeout(config.pidof_command(), &[own_name.as_str()], limit).await {
        Ok(out) => {
            let pids = parse_pid_list(&out);
            println!(
                "   ✅ {} resolved {} process(es) for '{}'",
                config.pidof_command(),
                pids.len(),
                own_name
            );
        }
        Err(e) => {
            println!("   ❌ {} failed: {:#}", config.pidof_command(), e);
            all_ok = false;
        }
    }

    // Capture and parse our own memory map
    println!("\n💾 Checking {}...", config.pmap_command());
    let own_pid = std::process::id().to_string();
    match capture_report(config.pmap_command(), &own_pid, limit).await {
        Ok(raw) => {
            let report = analyze_process(
                &own_pid,
                report_body(&raw.text, config.header_lines()),
                config.average_divisor(),
            );
            println!(
                "   ✅ Parsed {} mappings, total size {} KB, RSS {} KB",
                report.mappings.len(),
                report.totals.size_kb,
                report.totals.resident_kb
            );
            if report.skipped_lines > 0 {
                println!(
                    "   ⚠️  {} line(s) could not be parsed - check header_lines",
                    report.skipped_lines
                );
            }
        }
        Err(e) => {
            println!("   ❌ {:#}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
