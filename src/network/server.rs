//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::sync::WaitGroup;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable trigger that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and close its connections
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// TCP server for fifokv
///
/// ## Threading:
/// - The accept loop runs on the caller's thread (`run` blocks)
/// - Every connection gets a dedicated thread
/// - Live sockets are registered so shutdown can unblock their reads
pub struct Server {
    config: Config,
    store: Arc<Store>,
    listener: TcpListener,
    shutdown: ShutdownHandle,

    /// Clones of live connection sockets, keyed by connection id
    live: Arc<Mutex<HashMap<u64, TcpStream>>>,

    next_conn_id: u64,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn new(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept lets the loop notice shutdown requests
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            store,
            listener,
            shutdown: ShutdownHandle::default(),
            live: Arc::new(Mutex::new(HashMap::new())),
            next_conn_id: 0,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Get a handle that can stop this server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Number of connections currently being served
    pub fn connection_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Start the server (blocking)
    ///
    /// Returns once shutdown is triggered and every connection thread has
    /// finished.
    pub fn run(&mut self) -> Result<()> {
        let sessions = WaitGroup::new();

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = self.spawn_connection(stream, addr, &sessions) {
                        tracing::warn!("Failed to start connection from {}: {}", addr, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        {
            let live = self.live.lock();
            tracing::info!("Shutting down, closing {} connections", live.len());
            for stream in live.values() {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }

        sessions.wait();
        tracing::info!("All connections closed");
        Ok(())
    }

    fn spawn_connection(
        &mut self,
        stream: TcpStream,
        addr: SocketAddr,
        sessions: &WaitGroup,
    ) -> Result<()> {
        if self.connection_count() >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: {} connections already open",
                addr,
                self.config.max_connections
            );
            return Ok(());
        }

        // Accepted sockets may inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;

        let id = self.next_conn_id;
        self.next_conn_id += 1;

        let registered = stream.try_clone()?;
        let mut connection = Connection::new(stream, Arc::clone(&self.store), &self.config)?;
        self.live.lock().insert(id, registered);

        let live = Arc::clone(&self.live);
        let guard = sessions.clone();
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
                }
                live.lock().remove(&id);
                drop(guard);
            });

        if let Err(e) = spawned {
            self.live.lock().remove(&id);
            return Err(e.into());
        }
        Ok(())
    }
}
