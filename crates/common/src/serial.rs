//! Serial number generation by equivalence class
//!
//! Each [`EquivalenceClass`] maps to exactly one generation rule, so UI and
//! API scenarios share a single definition of what "too long", "too short"
//! and "invalid" mean:
//!
//! | Class         | Tag       | Output                                   |
//! |---------------|-----------|------------------------------------------|
//! | `Valid`       | `valid`   | `SN-` + 8 uppercase alphanumerics        |
//! | `Empty`       | `empty`   | `""`                                     |
//! | `TooShort`    | `short`   | 1 uppercase alphanumeric                 |
//! | `TooLong`     | `long`    | 258 uppercase alphanumerics              |
//! | `SymbolsOnly` | `symbols` | 8 ASCII punctuation characters           |

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::{Violation, MAX_SERIAL_LEN, MIN_SERIAL_LEN};

/// Prefix carried by every valid serial number
pub const SERIAL_PREFIX: &str = "SN-";

/// Length of the random part of a valid serial number
pub const VALID_BODY_LEN: usize = 8;

/// Length of a too-long serial number, two past the accepted maximum
pub const TOO_LONG_LEN: usize = MAX_SERIAL_LEN + 2;

/// Length of a too-short serial number
pub const TOO_SHORT_LEN: usize = MIN_SERIAL_LEN - 1;

/// Length of a symbols-only serial number
pub const SYMBOLS_LEN: usize = 8;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SYMBOLS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Category of serial number input used for boundary-value scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceClass {
    Valid,
    Empty,
    TooShort,
    TooLong,
    SymbolsOnly,
}

impl EquivalenceClass {
    pub const ALL: [EquivalenceClass; 5] = [
        EquivalenceClass::Valid,
        EquivalenceClass::Empty,
        EquivalenceClass::TooShort,
        EquivalenceClass::TooLong,
        EquivalenceClass::SymbolsOnly,
    ];

    /// Short tag used on the command line and in reports
    pub fn tag(&self) -> &'static str {
        match self {
            EquivalenceClass::Valid => "valid",
            EquivalenceClass::Empty => "empty",
            EquivalenceClass::TooShort => "short",
            EquivalenceClass::TooLong => "long",
            EquivalenceClass::SymbolsOnly => "symbols",
        }
    }

    /// The acceptance rule a value of this class is built to break
    pub fn expected_violation(&self) -> Option<Violation> {
        match self {
            EquivalenceClass::Valid => None,
            EquivalenceClass::Empty => Some(Violation::Empty),
            EquivalenceClass::TooShort => Some(Violation::TooShort {
                len: TOO_SHORT_LEN,
                min: MIN_SERIAL_LEN,
            }),
            EquivalenceClass::TooLong => Some(Violation::TooLong {
                len: TOO_LONG_LEN,
                max: MAX_SERIAL_LEN,
            }),
            EquivalenceClass::SymbolsOnly => Some(Violation::NoAlphanumeric),
        }
    }

    /// Generate a value of this class using the thread-local RNG
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Generate a value of this class from the given RNG
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            EquivalenceClass::Valid => {
                let mut serial = String::with_capacity(SERIAL_PREFIX.len() + VALID_BODY_LEN);
                serial.push_str(SERIAL_PREFIX);
                serial.push_str(&sample(rng, ALPHANUMERIC, VALID_BODY_LEN));
                serial
            }
            EquivalenceClass::Empty => String::new(),
            EquivalenceClass::TooShort => sample(rng, ALPHANUMERIC, TOO_SHORT_LEN),
            EquivalenceClass::TooLong => sample(rng, ALPHANUMERIC, TOO_LONG_LEN),
            EquivalenceClass::SymbolsOnly => sample(rng, SYMBOLS, SYMBOLS_LEN),
        }
    }
}

impl fmt::Display for EquivalenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EquivalenceClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EquivalenceClass::ALL
            .into_iter()
            .find(|class| class.tag() == s)
            .ok_or_else(|| Error::UnknownClass(s.to_string()))
    }
}

/// Generate a serial number of the given class
pub fn generate_serial_number(class: EquivalenceClass) -> String {
    class.generate()
}

/// Uppercase alphanumeric string of exactly `len` characters
pub fn alphanumeric(len: usize) -> String {
    sample(&mut rand::thread_rng(), ALPHANUMERIC, len)
}

fn sample<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}
