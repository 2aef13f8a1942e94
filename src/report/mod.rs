//! Parsing of `pmap -x` reports into per-process statistics.
//!
//! This module provides:
//! - `classifier`: body line categories (mapping, total, separator, repeat)
//! - `tokenizer`: character-class field extraction
//! - `convert`: lenient decimal / hex conversion
//! - `permissions`: permission flag tallies
//! - `aggregator`: the per-process state machine producing a `ProcessReport`

pub mod aggregator;
pub mod classifier;
pub mod convert;
pub mod error;
pub mod permissions;
pub mod tokenizer;

// Re-export commonly used types
pub use aggregator::{
    analyze_process, AverageDivisor, LineOutcome, MappingAggregator, MemoryAverages, ProcessReport,
};
pub use classifier::{classify, LineKind};
pub use convert::{dec_convert, hex_convert};
pub use error::ParseError;
pub use permissions::{normalize_permissions, PermissionTally};
pub use tokenizer::{parse_mapping_row, parse_totals_row, MappingRecord, MemoryTotals};
