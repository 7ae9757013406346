//! Server-Sent Events parsing for streamed completions.
//!
//! Handles:
//! - line buffering across chunk boundaries
//! - `data:` prefix extraction
//! - the `[DONE]` terminator
//! - read errors, which are surfaced as a final `Err` item

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use regdesk_core::{RegdeskError, Result};
use std::fmt::Display;
use std::pin::Pin;

/// A meaningful SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` line.
    Data(String),
    /// The `[DONE]` marker.
    Done,
}

struct ParserState<S> {
    stream: Pin<Box<S>>,
    buffer: BytesMut,
    finished: bool,
}

/// Turns a chunked byte stream into SSE events.
///
/// The output ends after `[DONE]`, after a read error (yielded as `Err`),
/// or when the input ends. In the last case any unterminated line left in
/// the buffer is still parsed.
pub fn parse_sse_events<S, E>(byte_stream: S) -> impl Stream<Item = Result<SseEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = ParserState {
        stream: Box::pin(byte_stream),
        buffer: BytesMut::with_capacity(8192),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            if let Some(newline_pos) = state.buffer.iter().position(|&b| b == b'\n') {
                let mut line = state.buffer.split_to(newline_pos + 1);
                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }

                match classify_line(&line) {
                    Some(SseEvent::Done) => {
                        state.finished = true;
                        return Some((Ok(SseEvent::Done), state));
                    }
                    Some(event) => return Some((Ok(event), state)),
                    None => continue,
                }
            }

            match state.stream.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    tracing::warn!("SSE stream read error: {e}");
                    state.finished = true;
                    let err = RegdeskError::provider(format!("Stream read failed: {e}"), true);
                    return Some((Err(err), state));
                }
                None => {
                    state.finished = true;
                    if state.buffer.is_empty() {
                        return None;
                    }
                    let rest = state.buffer.split();
                    return classify_line(&rest).map(|event| (Ok(event), state));
                }
            }
        }
    })
}

/// Classifies one line. Comments, blank lines, non-data fields and
/// invalid UTF-8 are skipped.
fn classify_line(line: &[u8]) -> Option<SseEvent> {
    let line = std::str::from_utf8(line).ok()?.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))?
        .trim();

    match data {
        "" => None,
        "[DONE]" => Some(SseEvent::Done),
        other => Some(SseEvent::Data(other.to_string())),
    }
}
