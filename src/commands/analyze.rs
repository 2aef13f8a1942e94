//! Analyze command implementation.
//!
//! Resolves the PIDs of a program, captures one report per PID and writes
//! per-process and program-wide results, once per run.

use std::path::Path;
use std::time::{Duration, Instant};

use pmap_stats::{analyze_process, FileSink, ProgramAggregator, ProgramTotals};
use tracing::{info, warn};

use crate::config::Config;
use crate::process::{capture_report, find_pids, report_body};

/// Options of a single `analyze` invocation.
pub struct AnalyzeOptions<'a> {
    pub program: &'a str,
    pub runs: usize,
    pub keep_raw: bool,
    pub quiet: bool,
}

/// Captures and analyzes every process of a program.
pub async fn command_analyze(
    opts: AnalyzeOptions<'_>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = config.output_dir();
    info!(
        "Analyzing '{}' for {} run(s) into {}",
        opts.program,
        opts.runs,
        output_dir.display()
    );

    for run in 0..opts.runs {
        let run_dir = output_dir.join(format!("run{}", run));
        let start = Instant::now();
        let (totals, processes) = analyze_run(&opts, config, &run_dir).await?;

        println!(
            "Run {}/{}: {} process(es), total size {} KB, RSS {} KB, dirty {} KB ({:.2}ms) -> {}",
            run + 1,
            opts.runs,
            processes,
            totals.size_kb,
            totals.resident_kb,
            totals.dirty_kb,
            start.elapsed().as_secs_f64() * 1000.0,
            run_dir.display()
        );
    }

    Ok(())
}

async fn analyze_run(
    opts: &AnalyzeOptions<'_>,
    config: &Config,
    run_dir: &Path,
) -> Result<(ProgramTotals, usize), Box<dyn std::error::Error>> {
    let limit = Duration::from_secs(config.command_timeout_secs());
    let keep_raw = opts.keep_raw || config.keep_raw_reports.unwrap_or(false);
    let raw_dir = run_dir.join("raw");

    let pids = find_pids(config.pidof_command(), opts.program, limit).await;
    if pids.is_empty() {
        warn!("'{}' has no running processes, program totals will be zero", opts.program);
    }

    let mut sink = FileSink::create(run_dir, config.output_format())?
        .with_mapping_rows(config.write_mapping_rows.unwrap_or(true))
        .with_summary(!opts.quiet);
    let mut program = ProgramAggregator::new(&mut sink);
    let mut failures = 0usize;

    // One process is captured, parsed and handed off before the next starts
    for pid in &pids {
        let raw = match capture_report(config.pmap_command(), pid, limit).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping pid {}: {:#}", pid, e);
                failures += 1;
                continue;
            }
        };

        if keep_raw {
            if let Err(e) = raw.save(&raw_dir) {
                warn!("Cannot keep raw report of pid {}: {:#}", pid, e);
            }
        }

        let report = analyze_process(
            &raw.pid,
            report_body(&raw.text, config.header_lines()),
            config.average_divisor(),
        );
        program.add_process(&report)?;
    }

    if failures > 0 {
        warn!("{} of {} process(es) could not be captured", failures, pids.len());
    }

    let processes = program.processes();
    let totals = program.finish()?;
    Ok((totals, processes))
}
