//! Wire types of the charge point REST API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned charge point identifier.
///
/// The service owns the format; it is accepted as a JSON string or number
/// and carried as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChargePointId(String);

impl ChargePointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChargePointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChargePointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ChargePointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ChargePointId(s),
            RawId::Number(n) => ChargePointId(n.to_string()),
        })
    }
}

/// A charge point as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargePoint {
    pub id: ChargePointId,
    pub serial_number: String,
}

/// Body of `POST /charge-point`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChargePoint {
    pub serial_number: String,
}

impl NewChargePoint {
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
        }
    }
}

/// Find the entry carrying `serial` in a listing
pub fn find_by_serial<'a>(
    charge_points: &'a [ChargePoint],
    serial: &str,
) -> Option<&'a ChargePoint> {
    charge_points.iter().find(|cp| cp.serial_number == serial)
}
