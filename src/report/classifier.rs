//! Line classification for report bodies.
//!
//! Header lines are stripped by whoever supplies the report; everything that
//! reaches [`classify`] is a body line.

use super::tokenizer::scan_address;

/// Run of fill characters that marks a separator / empty-region row.
const EMPTY_REGION_FILL: &str = "----";

/// Leading token of the trailing totals row.
const TOTALS_LABEL: &str = "total";

/// Category of a single body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Dash run in place of fields; carries no statistics.
    EmptyRegion,
    /// Trailing `total` row.
    TotalsRow,
    /// Ordinary mapping row.
    DataRow,
    /// Mid-body repeat whose address equals the previously stored mapping.
    DuplicateHeader,
}

impl LineKind {
    /// Lines of this kind are dropped without touching any aggregate.
    pub fn is_discarded(self) -> bool {
        matches!(self, LineKind::EmptyRegion | LineKind::DuplicateHeader)
    }
}

/// Classifies a body line.
///
/// `previous_address` is the address of the last mapping that was kept. The
/// duplicate check needs a provisional address, so candidate data rows are
/// partially tokenized here; a row whose address is missing or not hex stays
/// a `DataRow` and fails as malformed during full tokenization.
///
/// Blank lines are classified as `EmptyRegion`.
pub fn classify(line: &str, previous_address: Option<u64>) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with(EMPTY_REGION_FILL) {
        return LineKind::EmptyRegion;
    }
    if trimmed.starts_with(TOTALS_LABEL) {
        return LineKind::TotalsRow;
    }

    match (scan_address(trimmed), previous_address) {
        (Ok(address), Some(previous)) if address == previous => LineKind::DuplicateHeader,
        _ => LineKind::DataRow,
    }
}
