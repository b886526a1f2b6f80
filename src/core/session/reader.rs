use crate::core::event::{ErrorContext, SessionEvent};
use crate::core::session::session::SessionInner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Sleep between read attempts. Bounds CPU usage and, together with the read
/// timeout, bounds the stop-signal latency at roughly 1.2 s.
pub(super) const IDLE_PACING: Duration = Duration::from_millis(200);

/// The background reader loop for one connected session.
///
/// Turns the raw byte stream into `Received` line events. A read error is
/// fatal for the session (unlike a write error): it is reported as an
/// `Error` event and the loop exits. On exit for any reason the loop runs
/// the shared teardown itself, so the handle is always released and the
/// state converges to `Disconnected` even on an unsolicited I/O failure.
pub(super) async fn run(inner: Arc<SessionInner>) {
    debug!("reader loop started");
    loop {
        if inner.stop_requested() {
            break;
        }

        let read = {
            let mut guard = inner.transport.lock().await;
            match guard.as_mut() {
                Some(transport) => transport.read_line(),
                None => break,
            }
        };

        match read {
            Ok(Some(raw)) => {
                let text = decode_dropping_invalid(&raw);
                let text = text.trim_end();
                if !text.is_empty() {
                    inner.emit(SessionEvent::received(text));
                }
            }
            Ok(None) => {} // read timeout, nothing arrived
            Err(e) => {
                error!("fatal read error: {}", e);
                inner.emit(SessionEvent::error(ErrorContext::Read, e.to_string()));
                break;
            }
        }

        tokio::time::sleep(IDLE_PACING).await;
    }

    inner.teardown().await;
    debug!("reader loop exited");
}

/// Decode bytes as UTF-8, dropping malformed byte sequences.
///
/// Best-effort terminal display: invalid encoding is not an error condition,
/// and the bad bytes are discarded rather than replaced.
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                if let Ok(s) = std::str::from_utf8(valid) {
                    out.push_str(s);
                }
                match e.error_len() {
                    Some(len) => rest = &after[len..],
                    None => break, // truncated sequence at the end
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_clean_utf8() {
        assert_eq!(decode_dropping_invalid(b"hello"), "hello");
        assert_eq!(
            decode_dropping_invalid("température".as_bytes()),
            "température"
        );
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        // 0xFF can never start a UTF-8 sequence
        assert_eq!(decode_dropping_invalid(b"he\xFFllo"), "hello");
        assert_eq!(decode_dropping_invalid(b"\xFF\xFE"), "");
    }

    #[test]
    fn test_decode_drops_truncated_sequence_at_end() {
        // 0xC3 starts a two-byte sequence that never completes
        assert_eq!(decode_dropping_invalid(b"ok\xC3"), "ok");
    }

    #[test]
    fn test_decode_keeps_text_around_invalid_run() {
        assert_eq!(decode_dropping_invalid(b"a\xF0\x28b\xE2\x28c"), "a(b(c");
    }
}
