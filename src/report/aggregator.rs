//! Per-process aggregation of a report body.
//!
//! [`MappingAggregator`] consumes body lines one at a time. Each line is
//! classified, tokenized and checked into a local candidate first; only a fully
//! successful line is committed to the aggregator's state, so an error midway
//! through a line never leaves partial sums behind.

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, trace, warn, Span};

use super::classifier::{classify, LineKind};
use super::error::ParseError;
use super::permissions::PermissionTally;
use super::tokenizer::{parse_mapping_row, parse_totals_row, MappingRecord, MemoryTotals};

/// Divisor used when averaging per-mapping values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AverageDivisor {
    /// Kept mappings minus one. Matches the figures of the long-standing
    /// `<pid>totals.txt` output.
    #[default]
    LastIndex,
    /// Number of kept mappings.
    MappingCount,
}

impl AverageDivisor {
    fn divisor(self, kept: u64) -> u64 {
        match self {
            AverageDivisor::LastIndex => kept.saturating_sub(1),
            AverageDivisor::MappingCount => kept,
        }
    }
}

/// Per-mapping averages. `None` marks an average with a zero divisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAverages {
    pub size_kb: Option<f64>,
    pub resident_kb: Option<f64>,
    pub dirty_kb: Option<f64>,
}

impl MemoryAverages {
    pub fn is_defined(&self) -> bool {
        self.size_kb.is_some()
    }
}

/// Finalized parse of one process's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub pid: String,
    pub mappings: Vec<MappingRecord>,
    pub permissions: PermissionTally,
    /// Taken from the report's own `total` row, not summed from `mappings`.
    pub totals: MemoryTotals,
    pub averages: MemoryAverages,
    /// Lines dropped because they could not be tokenized.
    pub skipped_lines: u64,
}

/// What happened to a line fed into the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Appended,
    Totals,
    Discarded(LineKind),
    Skipped(ParseError),
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningSums {
    size_kb: u64,
    resident_kb: u64,
    dirty_kb: u64,
    kept: u64,
}

impl RunningSums {
    fn with(self, record: &MappingRecord) -> Self {
        Self {
            size_kb: self.size_kb.saturating_add(record.size_kb),
            resident_kb: self.resident_kb.saturating_add(record.resident_kb),
            dirty_kb: self.dirty_kb.saturating_add(record.dirty_kb),
            kept: self.kept + 1,
        }
    }

    fn averages(&self, divisor: AverageDivisor) -> MemoryAverages {
        let d = divisor.divisor(self.kept);
        if d == 0 {
            return MemoryAverages::default();
        }
        let d = d as f64;
        MemoryAverages {
            size_kb: Some(self.size_kb as f64 / d),
            resident_kb: Some(self.resident_kb as f64 / d),
            dirty_kb: Some(self.dirty_kb as f64 / d),
        }
    }
}

/// Builds a [`ProcessReport`] from the body lines of one process's report.
pub struct MappingAggregator {
    pid: String,
    /// Entered while a line is processed, so every event below it (converter
    /// warnings included) carries the pid.
    span: Span,
    divisor: AverageDivisor,
    mappings: Vec<MappingRecord>,
    permissions: PermissionTally,
    sums: RunningSums,
    totals: Option<MemoryTotals>,
    skipped_lines: u64,
}

impl MappingAggregator {
    pub fn new(pid: impl Into<String>, divisor: AverageDivisor) -> Self {
        let pid = pid.into();
        Self {
            span: info_span!("process", pid = %pid),
            pid,
            divisor,
            mappings: Vec::new(),
            permissions: PermissionTally::default(),
            sums: RunningSums::default(),
            totals: None,
            skipped_lines: 0,
        }
    }

    /// Number of mapping rows kept so far.
    pub fn kept(&self) -> u64 {
        self.sums.kept
    }

    /// Consumes one body line.
    pub fn feed(&mut self, line: &str) -> LineOutcome {
        let span = self.span.clone();
        let _entered = span.enter();

        let previous = self.mappings.last().map(|m| m.address);
        let kind = classify(line, previous);
        if kind.is_discarded() {
            trace!(?kind, "discarding line: {:?}", line);
            return LineOutcome::Discarded(kind);
        }

        let result = if kind == LineKind::TotalsRow {
            self.apply_totals(line)
        } else {
            self.apply_mapping(line)
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("skipping line: {}", e);
                self.skipped_lines += 1;
                LineOutcome::Skipped(e)
            }
        }
    }

    fn apply_totals(&mut self, line: &str) -> Result<LineOutcome, ParseError> {
        let totals = parse_totals_row(line)?;
        if self.totals.is_some() {
            debug!("report has more than one total row, keeping the last");
        }
        self.totals = Some(totals);
        Ok(LineOutcome::Totals)
    }

    fn apply_mapping(&mut self, line: &str) -> Result<LineOutcome, ParseError> {
        let record = parse_mapping_row(line)?;
        let mut permissions = self.permissions;
        permissions.count(&record.permissions)?;

        self.sums = self.sums.with(&record);
        self.permissions = permissions;
        self.mappings.push(record);
        Ok(LineOutcome::Appended)
    }

    /// Computes averages and hands back the finished report.
    pub fn finalize(self) -> ProcessReport {
        let _entered = self.span.clone().entered();

        let averages = self.sums.averages(self.divisor);
        if !averages.is_defined() {
            warn!(
                kept = self.sums.kept,
                "too few mappings to average, averages are undefined"
            );
        }

        let totals = self.totals.unwrap_or_else(|| {
            warn!("report has no total row, totals are zero");
            MemoryTotals::default()
        });

        debug!(
            mappings = self.mappings.len(),
            skipped = self.skipped_lines,
            "process report finalized"
        );

        ProcessReport {
            pid: self.pid,
            mappings: self.mappings,
            permissions: self.permissions,
            totals,
            averages,
            skipped_lines: self.skipped_lines,
        }
    }
}

/// Feeds every line of a report body through a fresh aggregator.
pub fn analyze_process<I, S>(pid: &str, lines: I, divisor: AverageDivisor) -> ProcessReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aggregator = MappingAggregator::new(pid, divisor);
    for line in lines {
        aggregator.feed(line.as_ref());
    }
    aggregator.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    const BODY: &[&str] = &[
        "00400000      8K      8K      0K r-xp  /bin/true",
        "00600000      4K      4K      4K rw-p  /bin/true",
        "7f0000000000 100K     50K     10K rw-s  [ shmem ]",
        "---------------- ------- ------- -------",
        "total          112K     62K     14K",
    ];

    // -------------------------------------------------------------------------
    // Tests for feed
    // -------------------------------------------------------------------------

    #[test]
    fn test_feed_outcomes() {
        let mut agg = MappingAggregator::new("42", AverageDivisor::LastIndex);
        assert_eq!(agg.feed(BODY[0]), LineOutcome::Appended);
        assert_eq!(agg.feed(BODY[0]), LineOutcome::Discarded(LineKind::DuplicateHeader));
        assert_eq!(agg.feed(BODY[3]), LineOutcome::Discarded(LineKind::EmptyRegion));
        assert_eq!(agg.feed(BODY[4]), LineOutcome::Totals);
        assert!(matches!(agg.feed("garbage"), LineOutcome::Skipped(_)));
        assert_eq!(agg.kept(), 1);
    }

    #[test]
    fn test_skipped_line_leaves_state_untouched() {
        let mut agg = MappingAggregator::new("1", AverageDivisor::LastIndex);
        agg.feed(BODY[0]);
        let outcome = agg.feed("00700000 4 4 4 r-x");
        assert!(matches!(
            outcome,
            LineOutcome::Skipped(ParseError::PermissionStringTooShort { .. })
        ));

        let report = agg.finalize();
        assert_eq!(report.mappings.len(), 1);
        assert_eq!(report.permissions.readable, 1);
        assert_eq!(report.skipped_lines, 1);
    }

    #[test]
    fn test_non_hex_addresses_are_skipped() {
        let body = ["zz 4 4 0 r-x-- a", "qq 8 8 0 rw--- b"];
        let report = analyze_process("9", body, AverageDivisor::LastIndex);
        assert!(report.mappings.is_empty());
        assert_eq!(report.skipped_lines, 2);
        assert_eq!(report.permissions, PermissionTally::default());
    }

    // -------------------------------------------------------------------------
    // Tests for log context
    // -------------------------------------------------------------------------

    /// In-memory writer for a scoped fmt subscriber.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_warnings_carry_pid() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        let body = [
            "00400000 99999999999999999999K 4K 0K r-xp  /bin/true",
            "zz 4 4 0 r-x-- a",
        ];
        tracing::subscriber::with_default(subscriber, || {
            analyze_process("4242", body, AverageDivisor::LastIndex)
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let conversion = output
            .lines()
            .find(|l| l.contains("conversion failure"))
            .expect("conversion warning");
        assert!(conversion.contains("pid=4242"), "{}", conversion);
        assert!(conversion.contains("99999999999999999999K"), "{}", conversion);

        let skipped = output
            .lines()
            .find(|l| l.contains("skipping line"))
            .expect("malformed line warning");
        assert!(skipped.contains("pid=4242"), "{}", skipped);
        assert!(skipped.contains("zz 4 4 0 r-x-- a"), "{}", skipped);
    }

    // -------------------------------------------------------------------------
    // Tests for finalize
    // -------------------------------------------------------------------------

    #[test]
    fn test_finalize_last_index_divisor() {
        let report = analyze_process("7", BODY, AverageDivisor::LastIndex);
        assert_eq!(report.mappings.len(), 3);
        // (8 + 4 + 100) / (3 - 1)
        assert_eq!(report.averages.size_kb, Some(56.0));
        assert_eq!(report.averages.resident_kb, Some(31.0));
        assert_eq!(report.averages.dirty_kb, Some(7.0));
    }

    #[test]
    fn test_finalize_mapping_count_divisor() {
        let report = analyze_process("7", BODY, AverageDivisor::MappingCount);
        assert_eq!(report.averages.size_kb, Some(112.0 / 3.0));
        assert_eq!(report.averages.dirty_kb, Some(14.0 / 3.0));
    }

    #[test]
    fn test_totals_come_from_total_row() {
        let body = [BODY[0], "total 999K 888K 777K"];
        let report = analyze_process("7", body, AverageDivisor::LastIndex);
        assert_eq!(report.totals.size_kb, 999);
        assert_eq!(report.totals.resident_kb, 888);
        assert_eq!(report.totals.dirty_kb, 777);
    }

    #[test]
    fn test_missing_total_row_is_zero() {
        let report = analyze_process("7", &BODY[..3], AverageDivisor::LastIndex);
        assert_eq!(report.totals, MemoryTotals::default());
        assert_eq!(report.mappings.len(), 3);
    }

    #[test]
    fn test_undefined_averages() {
        let empty: [&str; 0] = [];
        let report = analyze_process("7", empty, AverageDivisor::MappingCount);
        assert!(!report.averages.is_defined());

        let one = [BODY[0], BODY[4]];
        let report = analyze_process("7", one, AverageDivisor::LastIndex);
        assert_eq!(report.averages, MemoryAverages::default());

        let report = analyze_process("7", one, AverageDivisor::MappingCount);
        assert_eq!(report.averages.size_kb, Some(8.0));
    }

    #[test]
    fn test_permission_tally_over_body() {
        let report = analyze_process("7", BODY, AverageDivisor::LastIndex);
        let p = report.permissions;
        assert_eq!(p.readable, 3);
        assert_eq!(p.writable, 2);
        assert_eq!(p.executable, 1);
        assert_eq!(p.shareable, 1);
        assert_eq!(p.private, 2);
        assert_eq!(p.none, 0);
    }
}
