//! fifokv CLI Client
//!
//! Command-line interface for interacting with fifokv.

use std::io::Write;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use fifokv::{CacheError, Client, DEFAULT_LISTEN_ADDR};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// fifokv CLI
#[derive(Parser, Debug)]
#[command(name = "fifokv-cli")]
#[command(about = "CLI for the fifokv cache")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    server: String,

    /// Pause between a set line and its payload, in milliseconds
    #[arg(long, default_value = "20")]
    payload_delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Run random set/get round-trips and verify every value
    Stress {
        /// Number of round-trips
        #[arg(short, long, default_value = "10000")]
        iterations: usize,

        /// Length of each random key
        #[arg(long, default_value = "20")]
        key_len: usize,

        /// Length of each random value
        #[arg(long, default_value = "1024")]
        value_len: usize,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> fifokv::Result<()> {
    let mut client = Client::connect(&args.server)?;
    client.set_payload_delay(Duration::from_millis(args.payload_delay_ms));

    match args.command {
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => {
                let mut stdout = std::io::stdout();
                stdout.write_all(&value)?;
                stdout.write_all(b"\n")?;
            }
            None => println!("(missing)"),
        },
        Commands::Set { key, value } => {
            client.set(&key, value.as_bytes())?;
            println!("OK");
        }
        Commands::Stress {
            iterations,
            key_len,
            value_len,
        } => stress(&mut client, iterations, key_len, value_len)?,
    }

    Ok(())
}

fn stress(client: &mut Client, iterations: usize, key_len: usize, value_len: usize) -> fifokv::Result<()> {
    let mut rng = rand::thread_rng();
    let started = Instant::now();

    for i in 0..iterations {
        let key = random_text(&mut rng, key_len);
        let value = random_text(&mut rng, value_len);

        client.set(&key, value.as_bytes())?;
        match client.get(&key)? {
            Some(read) if read == value.as_bytes() => {}
            other => {
                return Err(CacheError::UnexpectedResponse(format!(
                    "round-trip {} for {} returned {:?}",
                    i,
                    key,
                    other.map(|v| v.len())
                )));
            }
        }
    }

    let elapsed = started.elapsed();
    println!(
        "{} round-trips in {:.2?} ({:.0}/s)",
        iterations,
        elapsed,
        iterations as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn random_text<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
