//! Charge Point Common Library
//!
//! Data model of the charge point service, the serial number generator used
//! to exercise its validation boundary, and the acceptance rules that boundary
//! is assumed to follow.

pub mod error;
pub mod serial;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{Error, Result};
pub use serial::{alphanumeric, generate_serial_number, EquivalenceClass};
pub use types::{find_by_serial, ChargePoint, ChargePointId, NewChargePoint};
pub use validation::{SerialRules, Violation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
