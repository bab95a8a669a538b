//! Serial number acceptance rules of the charge point service
//!
//! These are the rules the suite assumes the service enforces on
//! `POST /charge-point`. Uniqueness is not covered here since it depends on
//! what the service already stores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted serial number length
pub const MIN_SERIAL_LEN: usize = 2;

/// Largest accepted serial number length
pub const MAX_SERIAL_LEN: usize = 256;

/// A broken acceptance rule
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
    #[error("serial number is empty")]
    Empty,

    #[error("serial number has {len} character(s), minimum is {min}")]
    TooShort { len: usize, min: usize },

    #[error("serial number has {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("serial number contains no alphanumeric character")]
    NoAlphanumeric,
}

/// Length and charset bounds for serial numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialRules {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for SerialRules {
    fn default() -> Self {
        Self {
            min_len: MIN_SERIAL_LEN,
            max_len: MAX_SERIAL_LEN,
        }
    }
}

impl SerialRules {
    /// Check a candidate serial number.
    ///
    /// Length is measured in characters. Rules are checked in order: empty,
    /// too short, too long, charset.
    pub fn check(&self, serial: &str) -> Result<(), Violation> {
        let len = serial.chars().count();

        if len == 0 {
            return Err(Violation::Empty);
        }
        if len < self.min_len {
            return Err(Violation::TooShort { len, min: self.min_len });
        }
        if len > self.max_len {
            return Err(Violation::TooLong { len, max: self.max_len });
        }
        if !serial.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(Violation::NoAlphanumeric);
        }

        Ok(())
    }

    pub fn accepts(&self, serial: &str) -> bool {
        self.check(serial).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("" => Err(Violation::Empty); "empty")]
    #[test_case("A" => Err(Violation::TooShort { len: 1, min: 2 }); "one char")]
    #[test_case("AB" => Ok(()); "two chars")]
    #[test_case("SN-AB12CD34" => Ok(()); "prefixed")]
    #[test_case("!@#$%^&*" => Err(Violation::NoAlphanumeric); "symbols only")]
    #[test_case("--7--" => Ok(()); "one alphanumeric is enough")]
    fn test_check(serial: &str) -> Result<(), Violation> {
        SerialRules::default().check(serial)
    }

    #[test]
    fn test_length_boundary() {
        let rules = SerialRules::default();

        assert!(rules.accepts(&"A".repeat(256)));
        assert_eq!(
            rules.check(&"A".repeat(257)),
            Err(Violation::TooLong { len: 257, max: 256 })
        );
    }

    #[test]
    fn test_length_counts_chars() {
        // 128 two-byte characters plus one ASCII letter is 129 chars, 257 bytes
        let serial = format!("A{}", "é".repeat(128));
        assert!(SerialRules::default().accepts(&serial));
    }

    #[test]
    fn test_too_long_checked_before_charset() {
        let serial = "#".repeat(300);
        assert!(matches!(
            SerialRules::default().check(&serial),
            Err(Violation::TooLong { .. })
        ));
    }
}
