//! Error types for the Shapeshift core library
//!
//! This module defines the error handling system for the mapper, using
//! thiserror for ergonomic error definitions and anyhow for errors raised by
//! user supplied hooks.

use std::fmt;
use thiserror::Error;

/// Main error type for Shapeshift operations
#[derive(Error, Debug)]
pub enum Error {
    /// The target slot cannot be written to
    #[error("Target cannot be set: {field} may be unaddressable or a private field")]
    Unsettable {
        field: String,
    },

    /// A textual representation could not be parsed into the target type
    #[error("Parse error: cannot parse {value:?} into {target}: {source}")]
    Parse {
        target: String,
        value: String,
        #[source]
        source: ParseFailure,
    },

    /// A map key could not be converted between key types
    #[error("Cannot convert map key {key:?} from {from} to {to}")]
    KeyConversion {
        key: String,
        from: String,
        to: String,
    },

    /// A value failed its self-validation hook
    #[error("Invalid internal data in {type_name}: {source}")]
    InvalidData {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A marshal or unmarshal hook failed
    #[error("Hook {hook} failed for {type_name}: {source}")]
    Hook {
        type_name: String,
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A reflected value did not have the expected shape
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying parser failure, kept verbatim
#[derive(Error, Debug)]
pub enum ParseFailure {
    #[error(transparent)]
    Int(#[from] std::num::ParseIntError),

    #[error(transparent)]
    Float(#[from] std::num::ParseFloatError),

    #[error(transparent)]
    Bool(#[from] ParseBoolError),

    #[error(transparent)]
    Time(#[from] chrono::ParseError),

    #[error(transparent)]
    Uuid(#[from] uuid::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error returned when a string is not one of the accepted boolean spellings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoolError {
    pub input: String,
}

impl fmt::Display for ParseBoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid boolean syntax: {:?}", self.input)
    }
}

impl std::error::Error for ParseBoolError {}

impl Error {
    /// Build a parse error for `value` targeting a type named `target`
    pub(crate) fn parse(
        target: impl fmt::Display,
        value: &str,
        source: impl Into<ParseFailure>,
    ) -> Self {
        Error::Parse {
            target: target.to_string(),
            value: value.to_string(),
            source: source.into(),
        }
    }

    /// Whether this error came from a failed textual parse
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
