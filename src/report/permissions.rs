//! Permission flag tallies.
//!
//! `pmap -x` prints a five position mode string: read, write, execute,
//! shared and private (`r-x-p`, `rw---`, `-----`). The `/proc/<pid>/maps`
//! layout folds the last two positions into one (`r-xp`, `rw-s`); such a
//! token is widened to the five position form before counting.

use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// Number of flag positions in a normalized permission string.
pub const PERMISSION_LEN: usize = 5;

/// Mode string of a mapping that grants nothing.
pub const NO_PERMISSIONS: &str = "-----";

/// Per-process counts of mappings exhibiting each permission flag.
///
/// A mapping can bump several counters at once, so the sum of the counters
/// is unrelated to the number of mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTally {
    pub readable: u64,
    pub writable: u64,
    pub executable: u64,
    pub shareable: u64,
    pub private: u64,
    pub none: u64,
}

impl PermissionTally {
    /// Counts one mapping's mode string.
    ///
    /// The string must already be normalized to five positions (see
    /// [`normalize_permissions`]); shorter input is rejected without touching
    /// any counter.
    pub fn count(&mut self, mode: &str) -> Result<(), ParseError> {
        let flags: Vec<char> = mode.chars().collect();
        if flags.len() < PERMISSION_LEN {
            return Err(ParseError::PermissionStringTooShort {
                found: mode.to_string(),
            });
        }

        if flags[0] == 'r' {
            self.readable += 1;
        }
        if flags[1] == 'w' {
            self.writable += 1;
        }
        if flags[2] == 'x' {
            self.executable += 1;
        }
        if flags[3] == 's' {
            self.shareable += 1;
        }
        if flags[4] == 'p' {
            self.private += 1;
        }
        if mode == NO_PERMISSIONS {
            self.none += 1;
        }
        Ok(())
    }
}

/// Widens a mode token to the five position layout.
///
/// Five (or more) character tokens keep their first five characters. Four
/// character `maps` style tokens have their sharing flag moved to position 3
/// (`s`) or 4 (`p`). Anything shorter is an error.
pub fn normalize_permissions(token: &str) -> Result<String, ParseError> {
    let flags: Vec<char> = token.chars().take(PERMISSION_LEN).collect();
    match flags.len() {
        PERMISSION_LEN => Ok(flags.into_iter().collect()),
        4 => {
            let (shared, private) = match flags[3] {
                's' => ('s', '-'),
                'p' => ('-', 'p'),
                _ => ('-', '-'),
            };
            Ok([flags[0], flags[1], flags[2], shared, private]
                .into_iter()
                .collect())
        }
        _ => Err(ParseError::PermissionStringTooShort {
            found: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_of(mode: &str) -> PermissionTally {
        let mut t = PermissionTally::default();
        t.count(mode).unwrap();
        t
    }

    #[test]
    fn test_no_permissions_only_bumps_none() {
        let t = tally_of("-----");
        assert_eq!(
            t,
            PermissionTally {
                none: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_all_flags_bump_every_position_but_not_none() {
        let t = tally_of("rwxsp");
        assert_eq!(t.readable, 1);
        assert_eq!(t.writable, 1);
        assert_eq!(t.executable, 1);
        assert_eq!(t.shareable, 1);
        assert_eq!(t.private, 1);
        assert_eq!(t.none, 0);
    }

    #[test]
    fn test_every_flag_combination_matches_positions() {
        // Walk all 32 strings over {r,-}x{w,-}x{x,-}x{s,-}x{p,-}
        let letters = ['r', 'w', 'x', 's', 'p'];
        for bits in 0u32..32 {
            let mode: String = letters
                .iter()
                .enumerate()
                .map(|(i, &c)| if bits & (1 << i) != 0 { c } else { '-' })
                .collect();
            let t = tally_of(&mode);
            let set = |i: u32| u64::from(bits & (1 << i) != 0);

            assert_eq!(t.readable, set(0), "mode {mode}");
            assert_eq!(t.writable, set(1), "mode {mode}");
            assert_eq!(t.executable, set(2), "mode {mode}");
            assert_eq!(t.shareable, set(3), "mode {mode}");
            assert_eq!(t.private, set(4), "mode {mode}");
            assert_eq!(t.none, u64::from(bits == 0), "mode {mode}");
        }
    }

    #[test]
    fn test_short_string_is_rejected_untouched() {
        let mut t = PermissionTally::default();
        let err = t.count("r-x").unwrap_err();
        assert_eq!(
            err,
            ParseError::PermissionStringTooShort {
                found: "r-x".to_string()
            }
        );
        assert_eq!(t, PermissionTally::default());
    }

    // -------------------------------------------------------------------------
    // Tests for normalize_permissions
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalize_keeps_five_position_modes() {
        assert_eq!(normalize_permissions("r-x--").unwrap(), "r-x--");
        assert_eq!(normalize_permissions("rw-s-").unwrap(), "rw-s-");
        assert_eq!(normalize_permissions("-----").unwrap(), "-----");
        assert_eq!(normalize_permissions("rwxspX").unwrap(), "rwxsp");
    }

    #[test]
    fn test_normalize_widens_maps_style_modes() {
        assert_eq!(normalize_permissions("r-xp").unwrap(), "r-x-p");
        assert_eq!(normalize_permissions("rw-s").unwrap(), "rw-s-");
        assert_eq!(normalize_permissions("----").unwrap(), "-----");
    }

    #[test]
    fn test_normalize_rejects_short_tokens() {
        assert!(normalize_permissions("").is_err());
        assert!(normalize_permissions("r").is_err());
        assert!(normalize_permissions("r-x").is_err());
    }
}
