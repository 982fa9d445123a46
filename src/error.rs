//! Error types for fifokv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Unified error type for fifokv operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Value of {size} bytes exceeds store capacity of {capacity} bytes")]
    ValueTooLarge { size: usize, capacity: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// True when the error means the peer went away rather than something
    /// going wrong on our side
    pub fn is_disconnect(&self) -> bool {
        match self {
            CacheError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }

    /// True when a socket read or write timed out
    pub fn is_timeout(&self) -> bool {
        match self {
            // Unix reports WouldBlock for SO_RCVTIMEO, Windows uses TimedOut
            CacheError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
