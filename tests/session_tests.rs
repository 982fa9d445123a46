//! Session Tests
//!
//! Drives the per-connection state machine directly, without sockets:
//! - Line accumulation across reads
//! - Payload accumulation and read limits
//! - Validation errors leave the store alone
//! - Trailing bytes after a line are dropped, even for `set`

use std::sync::Arc;

use fifokv::network::{Session, SessionLimits, SessionState};
use fifokv::protocol::{RequestError, Response};
use fifokv::{CacheError, Store};

// =============================================================================
// Helper Functions
// =============================================================================

fn limits() -> SessionLimits {
    SessionLimits {
        read_chunk_size: 4,
        max_line_length: 32,
    }
}

fn setup_session(capacity: usize) -> (Arc<Store>, Session) {
    let store = Arc::new(Store::new(capacity));
    let session = Session::new(Arc::clone(&store), limits());
    (store, session)
}

/// Feed `data` the way a connection would, honoring `read_limit()`
fn feed_all(session: &mut Session, mut data: &[u8]) -> Vec<Response> {
    let mut responses = Vec::new();
    while !data.is_empty() {
        let n = session.read_limit().min(data.len());
        if let Some(response) = session.feed(&data[..n]).unwrap() {
            responses.push(response);
        }
        data = &data[n..];
    }
    responses
}

// =============================================================================
// Command Line Tests
// =============================================================================

#[test]
fn test_new_session_awaits_command_line() {
    let (_store, session) = setup_session(10);
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
    assert!(!session.is_awaiting_payload());
    assert_eq!(session.read_limit(), 4);
}

#[test]
fn test_get_split_across_reads() {
    let (_store, mut session) = setup_session(10);

    assert_eq!(session.feed(b"ge").unwrap(), None);
    assert_eq!(session.feed(b"t a\r").unwrap(), None);
    assert_eq!(session.feed(b"\n").unwrap(), Some(Response::Missing));
    assert_eq!(session.buffered_len(), 0);
}

#[test]
fn test_get_hit() {
    let (store, mut session) = setup_session(10);
    store.set("a", b"xyz".to_vec()).unwrap();

    let response = session.feed(b"get a\r\n").unwrap();

    assert_eq!(response, Some(Response::value(&b"xyz"[..])));
}

#[test]
fn test_bytes_after_get_line_are_discarded() {
    let (_store, mut session) = setup_session(10);

    let response = session.feed(b"get a\r\nget b\r\n").unwrap();

    assert_eq!(response, Some(Response::Missing));
    assert_eq!(session.buffered_len(), 0);
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
}

#[test]
fn test_validation_errors_leave_store_untouched() {
    let (store, mut session) = setup_session(10);

    let cases: Vec<(&[u8], RequestError)> = vec![
        (&b"set key abc\r\n"[..], RequestError::SizeNotNumber("abc".to_string())),
        (&b"set key 11\r\n"[..], RequestError::SizeTooLarge { capacity: 10 }),
        (&b"set key\r\n"[..], RequestError::SetUsage),
        (&b"get\r\n"[..], RequestError::GetUsage),
        (&b"foo bar baz\r\n"[..], RequestError::Unknown),
    ];

    for (line, expected) in cases {
        let response = session.feed(line).unwrap();
        assert_eq!(response, Some(Response::Error(expected)));
        assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
    }

    assert!(store.is_empty());
}

#[test]
fn test_line_too_long_ends_session() {
    let (_store, mut session) = setup_session(10);

    let result = session.feed(&[b'x'; 33]);

    assert!(matches!(result, Err(CacheError::LineTooLong { limit: 32 })));
}

// =============================================================================
// Payload Tests
// =============================================================================

#[test]
fn test_set_enters_payload_state() {
    let (_store, mut session) = setup_session(10);

    assert_eq!(session.feed(b"set k 5\r\n").unwrap(), None);

    assert_eq!(
        session.state(),
        &SessionState::AwaitingPayload {
            key: "k".to_string(),
            expected: 5
        }
    );
    assert!(session.is_awaiting_payload());
}

#[test]
fn test_read_limit_never_exceeds_missing_payload() {
    let (store, mut session) = setup_session(10);
    session.feed(b"set k 5\r\n").unwrap();

    assert_eq!(session.read_limit(), 4);
    assert_eq!(session.feed(b"hel").unwrap(), None);
    assert_eq!(session.read_limit(), 2);
    assert_eq!(session.feed(b"lo").unwrap(), Some(Response::Stored));

    assert_eq!(store.get("k").as_deref(), Some(&b"hello"[..]));
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
    assert_eq!(session.read_limit(), 4);
}

#[test]
fn test_payload_is_binary_safe() {
    let (store, mut session) = setup_session(10);
    let payload = [b'\r', b'\n', 0x00, 0xff, b'\r', b'\n'];

    session.feed(b"set bin 6\r\n").unwrap();
    let responses = feed_all(&mut session, &payload);

    assert_eq!(responses, vec![Response::Stored]);
    assert_eq!(store.get("bin").as_deref(), Some(&payload[..]));
}

#[test]
fn test_payload_arriving_with_line_is_discarded() {
    let (store, mut session) = setup_session(10);

    assert_eq!(session.feed(b"set k 3\r\nXYZ").unwrap(), None);
    assert_eq!(
        session.state(),
        &SessionState::AwaitingPayload {
            key: "k".to_string(),
            expected: 3
        }
    );
    assert_eq!(session.buffered_len(), 0);
    assert!(!store.contains_key("k"));

    assert_eq!(session.feed(b"abc").unwrap(), Some(Response::Stored));
    assert_eq!(store.get("k").as_deref(), Some(&b"abc"[..]));
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
}

#[test]
fn test_bytes_past_payload_are_discarded() {
    let (store, mut session) = setup_session(10);
    session.feed(b"set k 3\r\n").unwrap();

    let response = session.feed(b"abcget k\r\n").unwrap();

    assert_eq!(response, Some(Response::Stored));
    assert_eq!(store.get("k").as_deref(), Some(&b"abc"[..]));
    assert_eq!(session.buffered_len(), 0);
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
}

#[test]
fn test_zero_size_set_completes_immediately() {
    let (store, mut session) = setup_session(10);

    let response = session.feed(b"set empty 0\r\nget x\r\n").unwrap();

    assert_eq!(response, Some(Response::Stored));
    assert_eq!(store.get("empty").map(|v| v.len()), Some(0));
    assert_eq!(session.buffered_len(), 0);
    assert_eq!(session.state(), &SessionState::AwaitingCommandLine);
}

// =============================================================================
// Request Sequence Tests
// =============================================================================

#[test]
fn test_capacity_ten_scenario() {
    let (store, mut session) = setup_session(10);

    assert_eq!(feed_all(&mut session, b"set a 6\r\n"), Vec::<Response>::new());
    assert_eq!(feed_all(&mut session, b"AAAAAA"), vec![Response::Stored]);
    assert_eq!(feed_all(&mut session, b"set b 6\r\n"), Vec::<Response>::new());
    assert_eq!(feed_all(&mut session, b"BBBBBB"), vec![Response::Stored]);
    assert_eq!(feed_all(&mut session, b"get a\r\n"), vec![Response::Missing]);
    assert_eq!(
        feed_all(&mut session, b"get b\r\n"),
        vec![Response::value(&b"BBBBBB"[..])]
    );

    assert_eq!(store.occupied_bytes(), 6);
}

#[test]
fn test_error_then_valid_request() {
    let (store, mut session) = setup_session(10);

    assert_eq!(
        feed_all(&mut session, b"set key abc\r\n"),
        vec![Response::Error(RequestError::SizeNotNumber("abc".to_string()))]
    );
    feed_all(&mut session, b"set key 2\r\n");
    assert_eq!(feed_all(&mut session, b"ok"), vec![Response::Stored]);

    assert_eq!(store.get("key").as_deref(), Some(&b"ok"[..]));
}
