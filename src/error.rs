//! Error types for the ingester
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the ingester
#[derive(Error, Debug)]
pub enum Error {
    /// A stream configuration is missing a required field
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The payload cannot yield a valid Parquet schema
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// The Parquet encoder rejected the payload/schema pairing
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// An object store write failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// A Dremio call failed or returned a malformed response
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// A deadline was exceeded
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    /// A startup-time failure; the process exits
    #[error("Fatal init error: {message}")]
    FatalInit { message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Create a fatal init error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::FatalInit {
            message: message.into(),
        }
    }

    /// Whether this error should terminate the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FatalInit { .. })
    }

    /// Whether a redelivery of the same message could succeed
    ///
    /// Schema and encode failures are deterministic for a given payload;
    /// storage, catalog and timeout failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Storage { .. } | Error::Catalog { .. } | Error::Timeout { .. }
        )
    }
}

/// Result type alias for the ingester
pub type Result<T> = std::result::Result<T, Error>;
