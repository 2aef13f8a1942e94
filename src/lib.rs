//! pmap-stats library
//!
//! Turns `pmap -x` reports into per-process memory statistics and program-wide
//! totals. The library is free of process spawning: callers hand it report
//! lines and receive typed results through a [`ReportSink`].
//!
//! # Usage
//!
//! ```rust
//! use pmap_stats::{analyze_process, AverageDivisor, MemorySink, ProgramAggregator};
//!
//! let body = [
//!     "00400000      8K      8K      0K r-x--  /bin/true",
//!     "00600000      4K      4K      4K rw---  /bin/true",
//!     "---------------- ------- ------- -------",
//!     "total           12K     12K      4K",
//! ];
//!
//! let report = analyze_process("4242", body, AverageDivisor::default());
//! assert_eq!(report.mappings.len(), 2);
//! assert_eq!(report.permissions.readable, 2);
//!
//! let mut sink = MemorySink::default();
//! let mut run = ProgramAggregator::new(&mut sink);
//! run.add_process(&report).unwrap();
//! let totals = run.finish().unwrap();
//! assert_eq!(totals.size_kb, 12);
//! ```

pub mod output;
pub mod program;
pub mod report;

// Re-export main types for convenience
pub use output::{FileSink, OutputFormat};
pub use program::{MemorySink, ProgramAggregator, ProgramTotals, ReportSink};
pub use report::{
    analyze_process, AverageDivisor, MappingAggregator, MappingRecord, MemoryAverages,
    MemoryTotals, ParseError, PermissionTally, ProcessReport,
};
