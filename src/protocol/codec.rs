//! Protocol codec
//!
//! Parsing and formatting functions for the wire protocol. Nothing here
//! touches the store or keeps state between calls.

use std::io::{BufRead, Read, Write};

use crate::error::{CacheError, Result};
use super::{Request, RequestError, Response};

/// Terminates every request line and every response header
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

const OK: &str = "OK";
const MISSING: &str = "MISSING";

// =============================================================================
// Request Parsing
// =============================================================================

/// Find the end of the first request line in `buf`
///
/// Returns the index just past the first `\r\n`, or `None` if no full line
/// has arrived yet.
pub fn find_line_end(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len())
        .position(|w| w == LINE_TERMINATOR)
        .map(|pos| pos + LINE_TERMINATOR.len())
}

/// Parse a request line
///
/// The line is trimmed and split on single spaces, so doubled spaces yield
/// empty tokens that count toward the argument count. `capacity` bounds the
/// size a `set` may announce.
pub fn parse_request(line: &[u8], capacity: usize) -> std::result::Result<Request, RequestError> {
    let text = String::from_utf8_lossy(line);
    let tokens: Vec<&str> = text.trim().split(' ').collect();

    match tokens[0] {
        "get" => {
            if tokens.len() != 2 {
                return Err(RequestError::GetUsage);
            }
            Ok(Request::Get {
                key: tokens[1].to_string(),
            })
        }
        "set" => {
            if tokens.len() != 3 {
                return Err(RequestError::SetUsage);
            }
            let size = parse_size(tokens[2], capacity)?;
            Ok(Request::Set {
                key: tokens[1].to_string(),
                size,
            })
        }
        _ => Err(RequestError::Unknown),
    }
}

/// Validate a `set` size token
///
/// Digits only; an all-digit token too big for the store (even one that
/// overflows u64) is reported as too large rather than not-a-number.
fn parse_size(token: &str, capacity: usize) -> std::result::Result<usize, RequestError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RequestError::SizeNotNumber(token.to_string()));
    }

    match token.parse::<u64>() {
        Ok(size) if size <= capacity as u64 => Ok(size as usize),
        _ => Err(RequestError::SizeTooLarge { capacity }),
    }
}

/// Encode a request line, including the terminator
///
/// For `set` the caller sends the payload bytes right after.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let line = match request {
        Request::Get { key } => format!("get {}", key),
        Request::Set { key, size } => format!("set {} {}", key, size),
    };

    let mut message = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
    message.extend_from_slice(line.as_bytes());
    message.extend_from_slice(LINE_TERMINATOR);
    message
}

// =============================================================================
// Response Encoding
// =============================================================================

/// Encode a response to wire bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    match response {
        Response::Value(value) => {
            let header = format!("{} {}", OK, value.len());
            let mut message =
                Vec::with_capacity(header.len() + LINE_TERMINATOR.len() + value.len());
            message.extend_from_slice(header.as_bytes());
            message.extend_from_slice(LINE_TERMINATOR);
            message.extend_from_slice(value);
            message
        }
        Response::Missing => line_bytes(MISSING),
        Response::Stored => line_bytes(OK),
        Response::Error(err) => line_bytes(&err.to_string()),
    }
}

fn line_bytes(text: &str) -> Vec<u8> {
    let mut message = Vec::with_capacity(text.len() + LINE_TERMINATOR.len());
    message.extend_from_slice(text.as_bytes());
    message.extend_from_slice(LINE_TERMINATOR);
    message
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a response to a stream and flush it
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a request line to a stream and flush it
///
/// A `set` payload is not part of this write: the server drops anything that
/// arrives together with the line.
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writer.write_all(&encode_request(request))?;
    writer.flush()?;
    Ok(())
}

/// Read one `\r\n`-terminated reply line, returning it without the terminator
pub fn read_reply_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(CacheError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed before reply",
        )));
    }
    if !line.ends_with(LINE_TERMINATOR) {
        return Err(CacheError::Protocol(format!(
            "Reply line not terminated by CRLF: {:?}",
            String::from_utf8_lossy(&line)
        )));
    }
    line.truncate(line.len() - LINE_TERMINATOR.len());
    String::from_utf8(line).map_err(|e| CacheError::Protocol(format!("Reply is not UTF-8: {}", e)))
}

/// Read a complete `get` reply: `Some(value)` on a hit, `None` on a miss
pub fn read_get_reply<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let line = read_reply_line(reader)?;
    if line == MISSING {
        return Ok(None);
    }

    let len = line
        .strip_prefix("OK ")
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| CacheError::UnexpectedResponse(line.clone()))?;

    let mut value = vec![0u8; len];
    reader.read_exact(&mut value)?;
    Ok(Some(value))
}

/// Read a `set` reply, failing on anything but `OK`
pub fn read_set_reply<R: BufRead>(reader: &mut R) -> Result<()> {
    let line = read_reply_line(reader)?;
    if line == OK {
        Ok(())
    } else {
        Err(CacheError::UnexpectedResponse(line))
    }
}
