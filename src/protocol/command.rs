//! Request definitions
//!
//! Represents parsed requests from clients.

use thiserror::Error;

/// A parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up a key
    Get { key: String },

    /// Store `size` payload bytes under a key; the payload follows the line
    Set { key: String, size: usize },
}

impl Request {
    /// The key the request targets
    pub fn key(&self) -> &str {
        match self {
            Request::Get { key } | Request::Set { key, .. } => key,
        }
    }
}

/// A request line that failed validation
///
/// The `Display` text is exactly what goes back on the wire, minus `\r\n`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Error: Usage - get <key>")]
    GetUsage,

    #[error("Error: Usage - set <key> <size>")]
    SetUsage,

    #[error("Error: Size has to be a number (Received: {0})")]
    SizeNotNumber(String),

    #[error("Error: Size has to be less than {capacity}")]
    SizeTooLarge { capacity: usize },

    #[error("Unknown request received")]
    Unknown,
}
