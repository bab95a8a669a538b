//! Error types for the charge point data model

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown equivalence class '{0}' (expected valid, empty, short, long or symbols)")]
    UnknownClass(String),
}
