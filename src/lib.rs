//! # fifokv
//!
//! An in-memory key-value cache served over a line-oriented TCP protocol:
//! - `get <key>` / `set <key> <size>` requests, binary-safe payloads
//! - Total byte budget across all values
//! - Oldest-inserted entries evicted first when the budget is exceeded
//! - One thread per persistent client connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Connection / Session                         │
//! │     (AwaitingCommandLine <-> AwaitingPayload)                │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    Protocol     │                │      Store      │
//!   │ (parse/format)  │                │ (RwLock, FIFO)  │
//!   └─────────────────┘                └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, Result};
pub use config::{Config, ConfigBuilder, CAPACITY_BYTES, DEFAULT_LISTEN_ADDR};
pub use store::Store;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fifokv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
