//! Store Module
//!
//! The in-memory cache shared by every connection.
//!
//! ## Responsibilities
//! - Map keys to raw byte values
//! - Track occupied bytes incrementally
//! - Keep occupied bytes within the configured capacity
//! - Evict the oldest-inserted entries first (FIFO)
//!
//! ## Data Structure Choice
//! HashMap for lookups plus a VecDeque recording first-insertion order,
//! both behind a single RwLock:
//! - `get` takes the read lock, so lookups run concurrently
//! - `set` and the evictions it triggers run under the write lock,
//!   so readers never see a half-applied update
//! - Re-setting a key leaves its queue position alone

mod table;

pub use table::Store;
