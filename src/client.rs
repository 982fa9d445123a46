//! Blocking client
//!
//! Speaks the line protocol over one persistent TCP connection.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_get_reply, read_reply_line, read_set_reply, write_request, Request};

/// Default pause between a `set` line and its payload
pub const DEFAULT_PAYLOAD_DELAY: Duration = Duration::from_millis(20);

/// A connection to a fifokv server
///
/// The server discards bytes that arrive in the same read as a request line,
/// so `set` sends its payload only after waiting `payload_delay`.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    payload_delay: Duration,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let write_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(stream),
            writer: BufWriter::new(write_stream),
            payload_delay: DEFAULT_PAYLOAD_DELAY,
        })
    }

    /// Bound how long any reply may take
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Change how long `set` waits before sending its payload
    pub fn set_payload_delay(&mut self, delay: Duration) {
        self.payload_delay = delay;
    }

    /// Fetch a value, `None` if the server reports it missing
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let request = Request::Get { key: key.to_string() };
        write_request(&mut self.writer, &request)?;
        read_get_reply(&mut self.reader)
    }

    /// Store a value
    pub fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let request = Request::Set {
            key: key.to_string(),
            size: value.len(),
        };
        write_request(&mut self.writer, &request)?;

        // Size 0 completes on the line alone
        if !value.is_empty() {
            thread::sleep(self.payload_delay);
            self.writer.write_all(value)?;
            self.writer.flush()?;
        }
        read_set_reply(&mut self.reader)
    }

    /// Send bytes exactly as given
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read one reply line, without its `\r\n`
    pub fn read_reply_line(&mut self) -> Result<String> {
        read_reply_line(&mut self.reader)
    }

    /// Read exactly `len` raw reply bytes
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}
