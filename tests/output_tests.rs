//! Integration tests for the result writers.
//!
//! These tests write into temporary directories and check file layout and
//! formatting.

use std::fs;

use pmap_stats::output::{format_average, render_process_totals, render_summary};
use pmap_stats::{analyze_process, AverageDivisor, FileSink, OutputFormat, ProgramAggregator};

const BODY: [&str; 4] = [
    "00400000      8K      8K      0K r-x--  /bin/true",
    "00600000      4K      4K      4K rw---  /bin/true",
    "---------------- ------- ------- -------",
    "total           12K     12K      4K",
];

#[test]
fn test_format_average() {
    assert_eq!(format_average(Some(12.0)), "12.00");
    assert_eq!(format_average(Some(1.0 / 3.0)), "0.33");
    assert_eq!(format_average(None), "undefined");
}

#[test]
fn test_text_sink_layout() {
    let dir = tempfile::tempdir().unwrap();
    let run_dir = dir.path().join("run0");
    let report = analyze_process("4242", BODY, AverageDivisor::LastIndex);

    let mut sink = FileSink::create(&run_dir, OutputFormat::Text).unwrap();
    let mut run = ProgramAggregator::new(&mut sink);
    run.add_process(&report).unwrap();
    run.finish().unwrap();

    let rows = fs::read_to_string(run_dir.join("4242.txt")).unwrap();
    assert_eq!(
        rows,
        "           8           8           0\n           4           4           4\n"
    );

    let totals = fs::read_to_string(run_dir.join("4242totals.txt")).unwrap();
    let lines: Vec<&str> = totals.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0].split_whitespace().collect::<Vec<_>>(),
        ["Stat:", "Bytes", "RSS", "Dirty"]
    );
    assert_eq!(
        lines[1].split_whitespace().collect::<Vec<_>>(),
        ["Total:", "12", "12", "4"]
    );
    assert_eq!(
        lines[2].split_whitespace().collect::<Vec<_>>(),
        ["Average:", "12.00", "12.00", "4.00"]
    );

    let program = fs::read_to_string(run_dir.join("appTotals.txt")).unwrap();
    assert!(program.lines().nth(1).unwrap().ends_with("           4"));
}

#[test]
fn test_text_sink_without_mapping_rows() {
    let dir = tempfile::tempdir().unwrap();
    let report = analyze_process("9", BODY, AverageDivisor::LastIndex);

    let mut sink = FileSink::create(dir.path(), OutputFormat::Text)
        .unwrap()
        .with_mapping_rows(false);
    let mut run = ProgramAggregator::new(&mut sink);
    run.add_process(&report).unwrap();
    run.finish().unwrap();

    assert!(!dir.path().join("9.txt").exists());
    assert!(dir.path().join("9totals.txt").exists());
}

#[test]
fn test_json_sink_layout() {
    let dir = tempfile::tempdir().unwrap();
    let report = analyze_process("77", &BODY[..1], AverageDivisor::LastIndex);

    let mut sink = FileSink::create(dir.path(), OutputFormat::Json).unwrap();
    let mut run = ProgramAggregator::new(&mut sink);
    run.add_process(&report).unwrap();
    run.finish().unwrap();

    let text = fs::read_to_string(dir.path().join("77.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["pid"], "77");
    assert_eq!(value["mappings"][0]["permissions"], "r-x--");
    // One mapping: averages have no divisor and serialize as null
    assert!(value["averages"]["size_kb"].is_null());
    assert!(value["generated_at"].is_string());

    let program = fs::read_to_string(dir.path().join("appTotals.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&program).unwrap();
    assert_eq!(value["size_kb"], 0);
}

#[test]
fn test_undefined_averages_render() {
    let report = analyze_process("5", &BODY[..1], AverageDivisor::LastIndex);
    let table = render_process_totals(&report);
    assert!(table.lines().nth(2).unwrap().contains("undefined"));

    let summary = render_summary(&report);
    assert!(summary.contains("Readable:        1"));
    assert!(summary.contains("No permissions:  0"));
    assert!(summary.contains("undefined"));
}
