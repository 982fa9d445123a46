//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;

use super::RequestError;

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `get` hit with the stored value
    Value(Bytes),

    /// `get` miss
    Missing,

    /// `set` payload stored
    Stored,

    /// Request line failed validation
    Error(RequestError),
}

impl Response {
    /// Create a hit response
    pub fn value(value: impl Into<Bytes>) -> Self {
        Response::Value(value.into())
    }

    /// Check whether this response reports a validation failure
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl From<RequestError> for Response {
    fn from(err: RequestError) -> Self {
        Response::Error(err)
    }
}

impl From<Option<Bytes>> for Response {
    fn from(lookup: Option<Bytes>) -> Self {
        lookup.map_or(Response::Missing, Response::Value)
    }
}
