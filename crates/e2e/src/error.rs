//! Error types for E2E testing

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("No list entry matches '{0}'")]
    RowNotFound(String),

    #[error("{count} list entries match '{serial}', expected exactly one")]
    AmbiguousRow { serial: String, count: usize },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("{operation}: expected HTTP {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        operation: String,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("List did not empty after {attempts} deletion attempts ({remaining} entries left)")]
    DidNotConverge { attempts: usize, remaining: usize },

    #[error("Timeout after {elapsed:?} waiting for: {what}")]
    Timeout { what: String, elapsed: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] chargepoint_common::Error),
}

impl From<chromiumoxide::error::CdpError> for E2eError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        E2eError::Browser(err.to_string())
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
