//! fifokv Server Binary
//!
//! Starts the TCP server for fifokv.

use std::sync::Arc;

use clap::Parser;
use fifokv::network::Server;
use fifokv::{Config, Store, CAPACITY_BYTES, DEFAULT_LISTEN_ADDR};
use tracing_subscriber::{fmt, EnvFilter};

/// fifokv Server
#[derive(Parser, Debug)]
#[command(name = "fifokv-server")]
#[command(about = "In-memory key-value cache with FIFO eviction")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    /// Total bytes of values kept before evicting
    #[arg(short, long, default_value_t = CAPACITY_BYTES)]
    capacity_bytes: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Close connections idle for this long (0 = never)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Give up on responses that cannot be written in this long (0 = never)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fifokv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("fifokv Server v{}", fifokv::VERSION);
    tracing::info!("Capacity: {} bytes", args.capacity_bytes);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .capacity_bytes(args.capacity_bytes)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let store = Arc::new(Store::new(config.capacity_bytes));

    let mut server = match Server::new(config, store) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
