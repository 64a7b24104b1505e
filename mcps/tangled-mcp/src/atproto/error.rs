//! Error types for XRPC calls
//!
//! Every failure talking to a PDS or knot is classified here so the domain
//! layer can tell timeouts, outages, auth problems and swap conflicts apart.

use thiserror::Error;

/// Errors that can occur when calling an XRPC endpoint
#[derive(Error, Debug)]
pub enum XrpcError {
    /// The request did not complete within the configured timeout
    #[error("{method} timed out")]
    Timeout {
        /// XRPC method that was called
        method: String,
    },

    /// The upstream could not be reached or answered with a gateway error
    #[error("{method} unavailable: {reason}")]
    Unavailable {
        /// XRPC method that was called
        method: String,
        /// Transport or status detail
        reason: String,
    },

    /// Credentials were rejected
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The access token expired or was revoked mid-session
    #[error("session token rejected: {0}")]
    ExpiredToken(String),

    /// `swapRecord` no longer matches the stored record version
    #[error("record version mismatch: {0}")]
    VersionMismatch(String),

    /// Any other XRPC error response
    #[error("{method} failed ({status}): {error}: {message}")]
    Api {
        /// XRPC method that was called
        method: String,
        /// HTTP status code
        status: u16,
        /// XRPC error name (e.g. `InvalidRequest`)
        error: String,
        /// Human-readable message from the server
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("failed to decode {method} response: {reason}")]
    Decode {
        /// XRPC method that was called
        method: String,
        /// Decoder detail
        reason: String,
    },
}

/// Result type alias for XRPC operations
pub type XrpcResult<T> = Result<T, XrpcError>;
