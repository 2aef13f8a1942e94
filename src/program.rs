//! Program-wide accumulation across all processes of one run.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::report::ProcessReport;

/// Sum of the `total` rows of every process report in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramTotals {
    pub size_kb: u64,
    pub resident_kb: u64,
    pub dirty_kb: u64,
}

impl ProgramTotals {
    /// Adds one finished process report's totals.
    pub fn add_process(&mut self, report: &ProcessReport) {
        let sum = self.saturating_add(ProgramTotals {
            size_kb: report.totals.size_kb,
            resident_kb: report.totals.resident_kb,
            dirty_kb: report.totals.dirty_kb,
        });
        if sum.saturated() && !self.saturated() {
            warn!(pid = %report.pid, "program totals overflowed, clamping at u64::MAX");
        }
        *self = sum;
    }

    /// Field-wise addition that clamps at `u64::MAX` instead of wrapping.
    pub fn saturating_add(self, other: ProgramTotals) -> ProgramTotals {
        ProgramTotals {
            size_kb: self.size_kb.saturating_add(other.size_kb),
            resident_kb: self.resident_kb.saturating_add(other.resident_kb),
            dirty_kb: self.dirty_kb.saturating_add(other.dirty_kb),
        }
    }

    fn saturated(&self) -> bool {
        [self.size_kb, self.resident_kb, self.dirty_kb].contains(&u64::MAX)
    }
}

impl Add for ProgramTotals {
    type Output = ProgramTotals;

    fn add(self, other: ProgramTotals) -> ProgramTotals {
        self.saturating_add(other)
    }
}

impl AddAssign for ProgramTotals {
    fn add_assign(&mut self, other: ProgramTotals) {
        *self = *self + other;
    }
}

impl<'a> Sum<&'a ProcessReport> for ProgramTotals {
    fn sum<I: Iterator<Item = &'a ProcessReport>>(iter: I) -> Self {
        iter.fold(ProgramTotals::default(), |mut acc, report| {
            acc.add_process(report);
            acc
        })
    }
}

/// Receiver of finished results. Output formatting lives behind this trait.
pub trait ReportSink {
    type Error;

    fn accept_process(&mut self, report: &ProcessReport) -> Result<(), Self::Error>;

    fn accept_program(&mut self, totals: &ProgramTotals) -> Result<(), Self::Error>;
}

/// Collects everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub processes: Vec<ProcessReport>,
    pub program: Option<ProgramTotals>,
}

impl ReportSink for MemorySink {
    type Error = std::convert::Infallible;

    fn accept_process(&mut self, report: &ProcessReport) -> Result<(), Self::Error> {
        self.processes.push(report.clone());
        Ok(())
    }

    fn accept_program(&mut self, totals: &ProgramTotals) -> Result<(), Self::Error> {
        self.program = Some(*totals);
        Ok(())
    }
}

/// Drives a run: every finished process report goes to the sink and into the
/// program totals, which are handed over once the last process is done.
pub struct ProgramAggregator<'s, S: ReportSink> {
    sink: &'s mut S,
    totals: ProgramTotals,
    processes: usize,
}

impl<'s, S: ReportSink> ProgramAggregator<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Self {
            sink,
            totals: ProgramTotals::default(),
            processes: 0,
        }
    }

    pub fn add_process(&mut self, report: &ProcessReport) -> Result<(), S::Error> {
        self.sink.accept_process(report)?;
        self.totals.add_process(report);
        self.processes += 1;
        Ok(())
    }

    pub fn processes(&self) -> usize {
        self.processes
    }

    pub fn finish(self) -> Result<ProgramTotals, S::Error> {
        self.sink.accept_program(&self.totals)?;
        Ok(self.totals)
    }
}
