//! Configuration for fifokv
//!
//! Centralized configuration with sensible defaults.

use crate::error::{CacheError, Result};

/// Default byte budget for all stored values (128 MB, decimal)
pub const CAPACITY_BYTES: usize = 128_000_000;

/// Default TCP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:10011";

/// Shortest line that can carry a request ("get k")
const MIN_LINE_LENGTH: usize = 16;

/// Main configuration for a fifokv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Total bytes of values the store may hold before evicting
    pub capacity_bytes: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Largest single socket read
    pub read_chunk_size: usize,

    /// Longest request line accepted before the connection is dropped
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity_bytes: CAPACITY_BYTES,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            read_chunk_size: 1024,
            max_line_length: 64 * 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.capacity_bytes == 0 {
            return Err(CacheError::Config("capacity_bytes must be > 0".to_string()));
        }
        if self.max_connections == 0 {
            return Err(CacheError::Config("max_connections must be > 0".to_string()));
        }
        if self.read_chunk_size == 0 {
            return Err(CacheError::Config("read_chunk_size must be > 0".to_string()));
        }
        if self.max_line_length < MIN_LINE_LENGTH {
            return Err(CacheError::Config(format!(
                "max_line_length must be at least {} bytes",
                MIN_LINE_LENGTH
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store capacity (in bytes)
    pub fn capacity_bytes(mut self, bytes: usize) -> Self {
        self.config.capacity_bytes = bytes;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the largest single socket read (in bytes)
    pub fn read_chunk_size(mut self, bytes: usize) -> Self {
        self.config.read_chunk_size = bytes;
        self
    }

    /// Set the longest accepted request line (in bytes)
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
