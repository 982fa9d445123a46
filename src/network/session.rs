//! Session state machine
//!
//! Turns the bytes read off one connection into responses. No socket I/O
//! happens here; the connection asks `read_limit()` how much to read and
//! hands whatever arrived to `feed()`.

use std::sync::Arc;

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::protocol::{find_line_end, parse_request, Request, Response, LINE_TERMINATOR};
use crate::store::Store;

/// Where a session is in the request cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accumulating bytes until a `\r\n` ends the request line
    AwaitingCommandLine,

    /// Accumulating exactly `expected` payload bytes for `key`
    AwaitingPayload { key: String, expected: usize },
}

/// Per-session read limits
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Largest single read
    pub read_chunk_size: usize,

    /// Longest request line before the session gives up
    pub max_line_length: usize,
}

impl From<&Config> for SessionLimits {
    fn from(config: &Config) -> Self {
        Self {
            read_chunk_size: config.read_chunk_size,
            max_line_length: config.max_line_length,
        }
    }
}

/// Protocol state for a single connection
pub struct Session {
    store: Arc<Store>,
    state: SessionState,
    buffer: BytesMut,
    limits: SessionLimits,
}

impl Session {
    /// Create a session in the `AwaitingCommandLine` state
    pub fn new(store: Arc<Store>, limits: SessionLimits) -> Self {
        Self {
            store,
            state: SessionState::AwaitingCommandLine,
            buffer: BytesMut::with_capacity(limits.read_chunk_size),
            limits,
        }
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Check whether the session is collecting a `set` payload
    pub fn is_awaiting_payload(&self) -> bool {
        matches!(self.state, SessionState::AwaitingPayload { .. })
    }

    /// Bytes accumulated for the current line or payload
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// How many bytes the next read may request
    ///
    /// While a payload is pending this never exceeds the bytes still missing,
    /// so the next request is left on the socket.
    pub fn read_limit(&self) -> usize {
        match &self.state {
            SessionState::AwaitingCommandLine => self.limits.read_chunk_size,
            SessionState::AwaitingPayload { expected, .. } => self
                .limits
                .read_chunk_size
                .min(expected - self.buffer.len()),
        }
    }

    /// Consume bytes read from the peer
    ///
    /// Returns the response to send once a request completes, `None` while
    /// more bytes are needed. An error ends the session.
    pub fn feed(&mut self, data: &[u8]) -> Result<Option<Response>> {
        match self.state {
            SessionState::AwaitingCommandLine => self.feed_line(data),
            SessionState::AwaitingPayload { expected, .. } => self.feed_payload(data, expected),
        }
    }

    fn feed_line(&mut self, data: &[u8]) -> Result<Option<Response>> {
        self.buffer.extend_from_slice(data);

        let Some(end) = find_line_end(&self.buffer) else {
            if self.buffer.len() > self.limits.max_line_length {
                return Err(CacheError::LineTooLong {
                    limit: self.limits.max_line_length,
                });
            }
            return Ok(None);
        };

        let line = self.buffer.split_to(end);
        if !self.buffer.is_empty() {
            // No pipelining: whatever followed the line is dropped, payloads included
            tracing::trace!("Discarding {} bytes after request line", self.buffer.len());
            self.buffer.clear();
        }
        self.dispatch(&line[..end - LINE_TERMINATOR.len()])
    }

    fn dispatch(&mut self, line: &[u8]) -> Result<Option<Response>> {
        let request = match parse_request(line, self.store.capacity()) {
            Ok(request) => request,
            Err(err) => {
                tracing::trace!("Rejected request: {}", err);
                return Ok(Some(err.into()));
            }
        };
        tracing::trace!("Request for key {}", request.key());

        match request {
            Request::Get { key } => {
                let value = self.store.get(&key);
                tracing::trace!("get {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
                Ok(Some(value.into()))
            }
            Request::Set { key, size } => {
                tracing::trace!("set {} awaiting {} bytes", key, size);
                self.state = SessionState::AwaitingPayload { key, expected: size };
                if size == 0 {
                    return self.feed_payload(&[], 0);
                }
                Ok(None)
            }
        }
    }

    fn feed_payload(&mut self, data: &[u8], expected: usize) -> Result<Option<Response>> {
        let missing = expected - self.buffer.len();
        let take = data.len().min(missing);
        if take < data.len() {
            tracing::trace!("Discarding {} bytes past the payload", data.len() - take);
        }
        self.buffer.extend_from_slice(&data[..take]);

        if self.buffer.len() < expected {
            return Ok(None);
        }

        let value = self.buffer.split().freeze();
        let state = std::mem::replace(&mut self.state, SessionState::AwaitingCommandLine);
        if let SessionState::AwaitingPayload { key, .. } = state {
            let evicted = self.store.set(key, value)?;
            if evicted > 0 {
                tracing::debug!("set evicted {} entries", evicted);
            }
        }
        Ok(Some(Response::Stored))
    }
}
