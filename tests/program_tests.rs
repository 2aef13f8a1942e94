//! Integration tests for program-wide accumulation.

use pmap_stats::{
    analyze_process, AverageDivisor, MemorySink, ProgramAggregator, ProgramTotals, ReportSink,
};

fn report_with_totals(pid: &str, size: u64, rss: u64, dirty: u64) -> pmap_stats::ProcessReport {
    let total = format!("total {}K {}K {}K", size, rss, dirty);
    analyze_process(
        pid,
        ["00400000 4 4 0 r-x-- a", "00600000 4 4 4 rw--- a", total.as_str()],
        AverageDivisor::LastIndex,
    )
}

#[test]
fn test_two_processes_sum_in_any_order() {
    let a = report_with_totals("100", 100, 50, 10);
    let b = report_with_totals("200", 200, 75, 5);
    let expected = ProgramTotals {
        size_kb: 300,
        resident_kb: 125,
        dirty_kb: 15,
    };

    for order in [[&a, &b], [&b, &a]] {
        let mut totals = ProgramTotals::default();
        for report in order {
            totals.add_process(report);
        }
        assert_eq!(totals, expected);
    }
}

#[test]
fn test_empty_run_has_zero_totals() {
    let mut sink = MemorySink::default();
    let totals = ProgramAggregator::new(&mut sink).finish().unwrap();
    assert_eq!(totals, ProgramTotals::default());
    assert_eq!(sink.program, Some(ProgramTotals::default()));
    assert!(sink.processes.is_empty());
}

/// Sink that refuses process reports, to check error propagation.
struct FailingSink;

impl ReportSink for FailingSink {
    type Error = String;

    fn accept_process(&mut self, report: &pmap_stats::ProcessReport) -> Result<(), String> {
        Err(format!("cannot store {}", report.pid))
    }

    fn accept_program(&mut self, _totals: &ProgramTotals) -> Result<(), String> {
        Ok(())
    }
}

#[test]
fn test_sink_error_is_propagated_and_not_counted() {
    let mut sink = FailingSink;
    let mut run = ProgramAggregator::new(&mut sink);
    let err = run
        .add_process(&report_with_totals("7", 1, 1, 1))
        .unwrap_err();
    assert_eq!(err, "cannot store 7");
    assert_eq!(run.processes(), 0);
    assert_eq!(run.finish().unwrap(), ProgramTotals::default());
}
