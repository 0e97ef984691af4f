//! Error types for the Juncture library.

use thiserror::Error;

/// Errors that can occur during Juncture operations.
///
/// Missing reference data is never an error: lookups that find nothing return `None`
/// or an empty list. Only structurally invalid input ends up here.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be read.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A parse error occurred while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),
}
