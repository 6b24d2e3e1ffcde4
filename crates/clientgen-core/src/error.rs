//! Error handling for the clientgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias, and the per-operation
//! `OperationError` taxonomy that is collected into a run report instead of
//! aborting the whole run.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Result type for clientgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clientgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An identifier that normalizes to nothing usable
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// A normalized identifier hits a reserved word with no rename rule
    #[error("Identifier '{name}' collides with reserved word '{normalized}' and has no rename rule")]
    UnmappedIdentifierCollision { name: String, normalized: String },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Problems found while generating a single operation.
///
/// `Structural` and `UnmappedIdentifierCollision` are fatal to the operation
/// they belong to; the rest are warnings and the operation is still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationError {
    #[error("structural error: {reason}")]
    Structural { reason: String },

    #[error("identifier '{name}' collides with reserved word '{normalized}' and has no rename rule")]
    UnmappedIdentifierCollision { name: String, normalized: String },

    #[error("unknown type '{type_name}' referenced by {location}; falling back to an untyped value")]
    UnknownTypeReference { type_name: String, location: String },

    #[error("parameter '{name}' normalizes to '{normalized}', which is already in the signature")]
    DuplicateParameter { name: String, normalized: String },
}

impl OperationError {
    pub fn structural<S: Into<String>>(reason: S) -> Self {
        Self::Structural {
            reason: reason.into(),
        }
    }

    /// Whether this error stops the operation from being emitted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Structural { .. } | Self::UnmappedIdentifierCollision { .. }
        )
    }
}

impl From<Error> for OperationError {
    fn from(err: Error) -> Self {
        match err {
            Error::UnmappedIdentifierCollision { name, normalized } => {
                Self::UnmappedIdentifierCollision { name, normalized }
            }
            other => Self::structural(other.to_string()),
        }
    }
}
