// crates/twincheck-validator/src/error.rs
// ============================================================================
// Module: Validation Errors
// Description: Failure taxonomy for contract checks.
// Purpose: Name the endpoint and offending path or value on every failure.
// Dependencies: thiserror, twincheck-contract
// ============================================================================

//! ## Overview
//! Every check returns `Result<_, ValidationError>`. Failures are terminal for
//! the check that produced them; nothing is retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use twincheck_contract::ShapeViolation;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Contract validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Session configuration was rejected.
    #[error("configuration rejected: {0}")]
    Config(String),
    /// HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
    /// A contract schema failed to compile.
    #[error("contract schema error: {0}")]
    Schema(String),
    /// Request URL could not be built.
    #[error("{endpoint}: invalid request: {message}")]
    Request {
        /// Endpoint label.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Connection, TLS, timeout, or body read failure.
    #[error("{endpoint}: transport failure: {message}")]
    Transport {
        /// Endpoint label.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Unexpected HTTP status.
    #[error("{endpoint}: expected status {expected}, got {actual}")]
    Status {
        /// Endpoint label.
        endpoint: String,
        /// Accepted status codes, rendered for display.
        expected: String,
        /// Observed status code.
        actual: u16,
    },
    /// Response body does not match the endpoint schema.
    #[error("{endpoint}: {violation}")]
    Shape {
        /// Endpoint label.
        endpoint: String,
        /// First violation found.
        violation: ShapeViolation,
    },
    /// A value in a well-shaped response differs from what the request implies.
    #[error("{endpoint}: {path}: expected {expected}, got {actual}")]
    Mismatch {
        /// Endpoint label.
        endpoint: String,
        /// JSON path of the value.
        path: String,
        /// Expected value.
        expected: String,
        /// Observed value.
        actual: String,
    },
    /// Response body is not JSON or does not decode into the typed record.
    #[error("{endpoint}: response decode failed: {message}")]
    Decode {
        /// Endpoint label.
        endpoint: String,
        /// Failure detail.
        message: String,
    },
    /// Error response is missing or malforms the error envelope.
    #[error("{endpoint}: status {status} response lacks error envelope: {violation}")]
    Envelope {
        /// Endpoint label.
        endpoint: String,
        /// Observed status code.
        status: u16,
        /// First violation found.
        violation: ShapeViolation,
    },
}

impl ValidationError {
    /// Returns the JSON path the failure points at, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Shape {
                violation, ..
            }
            | Self::Envelope {
                violation, ..
            } => Some(violation.path.as_str()),
            Self::Mismatch {
                path, ..
            } => Some(path.as_str()),
            Self::Config(_)
            | Self::Client(_)
            | Self::Schema(_)
            | Self::Request {
                ..
            }
            | Self::Transport {
                ..
            }
            | Self::Status {
                ..
            }
            | Self::Decode {
                ..
            } => None,
        }
    }
}
