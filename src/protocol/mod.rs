//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Request Format
//! A request is a UTF-8 line terminated by `\r\n`, split on single spaces:
//! ```text
//! get <key>\r\n
//! set <key> <size>\r\n<size raw bytes>
//! ```
//! The `set` payload is binary-safe and carries no terminator of its own.
//!
//! ## Response Format
//! ```text
//! OK <len>\r\n<value>      get hit
//! MISSING\r\n              get miss
//! OK\r\n                   set stored
//! <error text>\r\n         validation failure
//! ```

mod command;
mod response;
mod codec;

pub use command::{Request, RequestError};
pub use response::Response;
pub use codec::{
    encode_request, encode_response, find_line_end, parse_request,
    read_get_reply, read_reply_line, read_set_reply,
    write_request, write_response, LINE_TERMINATOR,
};
