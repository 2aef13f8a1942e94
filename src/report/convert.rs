//! Numeric converters for report tokens.
//!
//! Both converters are total: any input yields a number. A token without a
//! usable leading digit run converts to 0 and a warning is logged, so a single
//! bad cell only degrades accuracy instead of stopping the parse.
//!
//! Only the leading digit run is significant. `pmap -x` prints plain numbers,
//! other builds append a `K` unit (`1234K`); both convert to `1234`.

use tracing::warn;

/// Converts a decimal token (e.g. `"1234"` or `"1234K"`) to an integer.
pub fn dec_convert(token: &str) -> u64 {
    convert_radix(token, 10)
}

/// Converts a hexadecimal token without `0x` prefix (e.g. `"7f3a2c000000"`).
pub fn hex_convert(token: &str) -> u64 {
    convert_radix(token, 16)
}

fn convert_radix(token: &str, radix: u32) -> u64 {
    let digits_end = token
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    let digits = &token[..digits_end];

    if digits.is_empty() {
        warn!(token, radix, "conversion failure: no digits, using 0");
        return 0;
    }

    match u64::from_str_radix(digits, radix) {
        Ok(v) => v,
        Err(e) => {
            warn!(token, radix, "conversion failure ({}), using 0", e);
            0
        }
    }
}
