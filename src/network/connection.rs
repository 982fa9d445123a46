//! Connection Handler
//!
//! Drives a `Session` over one client socket.

use std::io::{BufWriter, ErrorKind, Read};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::protocol::write_response;
use crate::store::Store;

use super::session::{Session, SessionLimits};

/// Handles a single client connection
pub struct Connection {
    /// Unbuffered read side; a BufReader would read past a pending payload
    reader: TcpStream,

    /// TCP stream writer (buffered, flushed after every response)
    writer: BufWriter<TcpStream>,

    /// Protocol state for this connection
    session: Session,

    /// Scratch space for socket reads
    read_buf: Vec<u8>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Disables Nagle and applies the configured timeouts
    pub fn new(stream: TcpStream, store: Arc<Store>, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let write_stream = stream.try_clone()?;
        let limits = SessionLimits::from(config);

        Ok(Self {
            reader: stream,
            writer: BufWriter::new(write_stream),
            session: Session::new(store, limits),
            read_buf: vec![0u8; limits.read_chunk_size],
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Serves requests one at a time. Returns `Ok` when the peer goes away
    /// or idles past the read timeout, `Err` on any other failure.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let limit = self.session.read_limit();
            let n = match self.reader.read(&mut self.read_buf[..limit]) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return self.close_with(e.into()),
            };

            let response = match self.session.feed(&self.read_buf[..n]) {
                Ok(Some(response)) => response,
                Ok(None) => continue,
                Err(e) => return self.close_with(e),
            };
            if response.is_error() {
                tracing::debug!("Rejected request from {}", self.peer_addr);
            }

            if let Err(e) = write_response(&mut self.writer, &response) {
                return self.close_with(e);
            }
        }
    }

    /// Sort a terminating error into a quiet close or a reported failure
    fn close_with(&self, err: CacheError) -> Result<()> {
        if err.is_disconnect() {
            tracing::debug!("Client {} dropped the connection: {}", self.peer_addr, err);
            return Ok(());
        }
        if err.is_timeout() {
            tracing::debug!("Idle timeout for client {}", self.peer_addr);
            return Ok(());
        }
        Err(err)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
