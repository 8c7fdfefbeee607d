//! # Error Types
//!
//! Structured error types for cpt_core. Only run-level problems surface as
//! errors: a bad site parameter fails the whole analysis before any row is
//! touched. Row-level defects never become a `CptError`; they are retained as
//! [`RejectReason`](crate::ingest::RejectReason) values instead.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::errors::{CptError, CptResult};
//!
//! fn validate_pga(pga_g: f64) -> CptResult<()> {
//!     if !(0.0..=1.0).contains(&pga_g) {
//!         return Err(CptError::invalid_input(
//!             "pga_g",
//!             pga_g.to_string(),
//!             "Peak ground acceleration must be between 0 and 1 g",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_pga(1.4).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for cpt_core operations
pub type CptResult<T> = Result<T, CptError>;

/// Structured error type for analysis operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CptError {
    /// A site parameter is invalid (non-numeric, out of range, unknown token)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required site parameter is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Measurements that leave the soil index undefined at a depth
    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Report schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CptError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CptError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CptError::MissingField {
            field: field.into(),
        }
    }

    /// Create a DegenerateInput error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        CptError::DegenerateInput {
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CptError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CptError::InvalidInput { .. } => "INVALID_INPUT",
            CptError::MissingField { .. } => "MISSING_FIELD",
            CptError::DegenerateInput { .. } => "DEGENERATE_INPUT",
            CptError::FileError { .. } => "FILE_ERROR",
            CptError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CptError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CptError {
    fn from(e: serde_json::Error) -> Self {
        CptError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CptError::invalid_input("magnitude", "abc", "Not a number");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CptError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CptError::missing_field("pga_g").error_code(), "MISSING_FIELD");
        assert_eq!(CptError::degenerate("qc below overburden").error_code(), "DEGENERATE_INPUT");
        assert_eq!(CptError::file_error("open", "cpt.json", "not found").error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_error_message_names_field() {
        let error = CptError::invalid_input("unit_weight_kn_m3", "-18", "Unit weight must be positive");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'unit_weight_kn_m3': -18 - Unit weight must be positive"
        );
    }
}
