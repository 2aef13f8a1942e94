//! Field tokenizer for `pmap -x` body lines.
//!
//! Fields are located by character class rather than by column: each numeric
//! field starts at the first digit after the end of the previous field and runs
//! to the next whitespace. Variable-width columns are therefore fine, but two
//! values glued together without a space cannot be told apart.
//!
//! ```text
//! 000055d5c6a8a000     132     132       0 r---- bash
//! 00400000    4K    4K    0K r-xp  /bin/true
//! total kB           12345    4567     890
//! ```

use serde::{Deserialize, Serialize};

use super::convert::{dec_convert, hex_convert};
use super::error::ParseError;
use super::permissions::normalize_permissions;

/// One virtual-memory mapping of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub address: u64,
    pub size_kb: u64,
    pub resident_kb: u64,
    pub dirty_kb: u64,
    /// Five position mode string (`r-x-p`, `rw---`, `-----`).
    pub permissions: String,
    /// File path or pseudo name (`[ anon ]`, `[ stack ]`); may be empty.
    pub backing_path: String,
}

/// Size, resident and dirty sums as printed on a report's `total` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTotals {
    pub size_kb: u64,
    pub resident_kb: u64,
    pub dirty_kb: u64,
}

/// Byte cursor over a single line. Every class it scans for is ASCII, so each
/// stop position falls on a char boundary.
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Moves to the first byte at or after the cursor matching `class`.
    fn seek(&mut self, class: impl Fn(u8) -> bool) -> bool {
        match self.line.as_bytes()[self.pos..].iter().position(|&b| class(b)) {
            Some(offset) => {
                self.pos += offset;
                true
            }
            None => {
                self.pos = self.line.len();
                false
            }
        }
    }

    /// Consumes bytes up to (not including) the next whitespace.
    fn token(&mut self) -> &'a str {
        let start = self.pos;
        self.seek(|b| b.is_ascii_whitespace());
        &self.line[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.seek(|b| !b.is_ascii_whitespace());
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    /// Leading address token. Anything other than hex digits is malformed, so
    /// an unreadable address never doubles as address 0.
    fn address_field(&mut self) -> Result<u64, ParseError> {
        self.skip_whitespace();
        let token = self.token();
        if token.is_empty() {
            return Err(ParseError::malformed(self.line, "missing address field"));
        }
        if !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::malformed(self.line, "address is not hexadecimal"));
        }
        Ok(hex_convert(token))
    }

    /// Next decimal field: first digit run after the cursor.
    fn decimal_field(&mut self, reason: &'static str) -> Result<u64, ParseError> {
        if !self.seek(|b| b.is_ascii_digit()) {
            return Err(ParseError::malformed(self.line, reason));
        }
        Ok(dec_convert(self.token()))
    }
}

/// Extracts only the leading hex address of a line.
///
/// Used to detect a repeated row before committing to full tokenization.
pub fn scan_address(line: &str) -> Result<u64, ParseError> {
    Cursor::new(line).address_field()
}

/// Tokenizes an ordinary mapping row.
pub fn parse_mapping_row(line: &str) -> Result<MappingRecord, ParseError> {
    let mut cursor = Cursor::new(line);
    let address = cursor.address_field()?;

    let size_kb = cursor.decimal_field("missing size field")?;
    let resident_kb = cursor.decimal_field("missing resident field")?;
    let dirty_kb = cursor.decimal_field("missing dirty field")?;

    if !cursor.seek(|b| b == b'-' || b == b'r') {
        return Err(ParseError::malformed(line, "missing permission field"));
    }
    let permissions = normalize_permissions(cursor.token())?;

    cursor.skip_whitespace();
    let backing_path = cursor.rest().trim_end().to_string();

    Ok(MappingRecord {
        address,
        size_kb,
        resident_kb,
        dirty_kb,
        permissions,
        backing_path,
    })
}

/// Tokenizes a `total` row. The label (`total`, `total kB`) holds no digits
/// and is passed over by the digit scan.
pub fn parse_totals_row(line: &str) -> Result<MemoryTotals, ParseError> {
    let mut cursor = Cursor::new(line);
    Ok(MemoryTotals {
        size_kb: cursor.decimal_field("missing total size")?,
        resident_kb: cursor.decimal_field("missing total resident")?,
        dirty_kb: cursor.decimal_field("missing total dirty")?,
    })
}
