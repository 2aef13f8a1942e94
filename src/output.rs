//! Result writers.
//!
//! [`FileSink`] lays out one run directory:
//!
//! ```text
//! <run dir>/<pid>.txt         size / rss / dirty per kept mapping
//! <run dir>/<pid>totals.txt   totals and averages of one process
//! <run dir>/appTotals.txt     totals across every process of the program
//! ```
//!
//! In JSON mode `<pid>.json` and `appTotals.json` are written instead.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::program::{ProgramTotals, ReportSink};
use crate::report::ProcessReport;

/// Column width of every numeric cell in text output.
const COLUMN_WIDTH: usize = 12;

/// Result file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders a per-mapping average, or `undefined` when it has no divisor.
pub fn format_average(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "undefined".to_string(),
    }
}

/// One line per kept mapping: size, resident, dirty.
pub fn render_mapping_rows(report: &ProcessReport) -> String {
    let mut out = String::new();
    for m in &report.mappings {
        out.push_str(&format!(
            "{:>w$}{:>w$}{:>w$}\n",
            m.size_kb,
            m.resident_kb,
            m.dirty_kb,
            w = COLUMN_WIDTH
        ));
    }
    out
}

/// Totals and averages table of one process.
pub fn render_process_totals(report: &ProcessReport) -> String {
    let t = &report.totals;
    let a = &report.averages;
    format!(
        "{:>w$}{:>w$}{:>w$}{:>w$}\n{:>w$}{:>w$}{:>w$}{:>w$}\n{:>w$}{:>w$}{:>w$}{:>w$}\n",
        "Stat:",
        "Bytes",
        "RSS",
        "Dirty",
        "Total:",
        t.size_kb,
        t.resident_kb,
        t.dirty_kb,
        "Average:",
        format_average(a.size_kb),
        format_average(a.resident_kb),
        format_average(a.dirty_kb),
        w = COLUMN_WIDTH
    )
}

/// Totals table across the whole program.
pub fn render_program_totals(totals: &ProgramTotals) -> String {
    format!(
        "{:>w$}{:>w$}{:>w$}{:>w$}\n{:>w$}{:>w$}{:>w$}{:>w$}\n",
        "Stat:",
        "Bytes",
        "RSS",
        "Dirty",
        "Total:",
        totals.size_kb,
        totals.resident_kb,
        totals.dirty_kb,
        w = COLUMN_WIDTH
    )
}

/// Human readable permission and memory summary of one process.
pub fn render_summary(report: &ProcessReport) -> String {
    let p = &report.permissions;
    let t = &report.totals;
    let a = &report.averages;
    let mut out = String::new();
    out.push_str(&format!("PID {}\n", report.pid));
    out.push_str("____________________________\n");
    out.push_str(&format!("Readable:        {}\n", p.readable));
    out.push_str(&format!("Writable:        {}\n", p.writable));
    out.push_str(&format!("Executable:      {}\n", p.executable));
    out.push_str(&format!("Sharable:        {}\n", p.shareable));
    out.push_str(&format!("Private:         {}\n", p.private));
    out.push_str(&format!("No permissions:  {}\n\n", p.none));
    out.push_str(&format!("{:<30}{:>10}\n", "Total size:", t.size_kb));
    out.push_str(&format!("{:<30}{:>10}\n", "Total RSS:", t.resident_kb));
    out.push_str(&format!("{:<30}{:>10}\n", "Total dirty pages:", t.dirty_kb));
    out.push_str(&format!(
        "{:<30}{:>10}\n",
        "Average total size:",
        format_average(a.size_kb)
    ));
    out.push_str(&format!(
        "{:<30}{:>10}\n",
        "Average RSS:",
        format_average(a.resident_kb)
    ));
    out.push_str(&format!(
        "{:<30}{:>10}\n",
        "Average dirty pages size:",
        format_average(a.dirty_kb)
    ));
    if report.skipped_lines > 0 {
        out.push_str(&format!(
            "{:<30}{:>10}\n",
            "Skipped malformed lines:", report.skipped_lines
        ));
    }
    out
}

#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    data: &'a T,
}

fn to_json<T: Serialize>(data: &T) -> io::Result<String> {
    let stamped = Stamped {
        generated_at: Utc::now(),
        data,
    };
    serde_json::to_string_pretty(&stamped).map_err(io::Error::other)
}

/// Writes results of one run into a directory.
pub struct FileSink {
    dir: PathBuf,
    format: OutputFormat,
    write_mapping_rows: bool,
    echo_summary: bool,
}

impl FileSink {
    /// Creates the run directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>, format: OutputFormat) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("Output directory ready: {}", dir.display());
        Ok(Self {
            dir,
            format,
            write_mapping_rows: true,
            echo_summary: false,
        })
    }

    pub fn with_mapping_rows(mut self, enabled: bool) -> Self {
        self.write_mapping_rows = enabled;
        self
    }

    /// Also print each process summary to stdout.
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.echo_summary = enabled;
        self
    }
}

impl ReportSink for FileSink {
    type Error = io::Error;

    fn accept_process(&mut self, report: &ProcessReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if self.write_mapping_rows {
                    let path = self.dir.join(format!("{}.txt", report.pid));
                    fs::write(&path, render_mapping_rows(report))?;
                }
                let path = self.dir.join(format!("{}totals.txt", report.pid));
                fs::write(&path, render_process_totals(report))?;
            }
            OutputFormat::Json => {
                let path = self.dir.join(format!("{}.json", report.pid));
                fs::write(&path, to_json(report)?)?;
            }
        }

        if self.echo_summary {
            println!("{}", render_summary(report));
        }
        Ok(())
    }

    fn accept_program(&mut self, totals: &ProgramTotals) -> io::Result<()> {
        let path = match self.format {
            OutputFormat::Text => {
                let path = self.dir.join("appTotals.txt");
                fs::write(&path, render_program_totals(totals))?;
                path
            }
            OutputFormat::Json => {
                let path = self.dir.join("appTotals.json");
                fs::write(&path, to_json(totals)?)?;
                path
            }
        };
        info!("Program totals written to: {}", path.display());
        Ok(())
    }
}
