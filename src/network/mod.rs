//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One thread per connection, each driving its own `Session`
//! - All sessions share one `Store`

mod server;
mod connection;
mod session;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use session::{Session, SessionLimits, SessionState};
