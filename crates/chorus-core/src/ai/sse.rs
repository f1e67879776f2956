//! SSE (Server-Sent Events) stream processing utilities
//!
//! Turns a provider's raw byte stream into a pull-based stream of JSON
//! events. Partial lines are buffered across network chunks.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::ai::providers::ProviderId;
use crate::error::ChatError;

/// One parsed `data:` payload
#[derive(Debug, Clone, PartialEq)]
pub enum SseData {
    Json(Value),
    /// `[DONE]` end-of-stream marker
    Done,
}

/// Line framer that handles partial lines and buffering
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes of the current unterminated line; may end inside a UTF-8 sequence
    partial_line: Vec<u8>,
    /// Event counter for logging
    event_count: usize,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every complete `data:` payload in order
    ///
    /// Lines are decoded only once their terminating newline has arrived,
    /// so a multi-byte character split across chunks is kept intact.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseData> {
        self.partial_line.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.partial_line[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.partial_line[start..end]).into_owned();
            start = end + 1;
            if let Some(data) = self.parse_line(&line) {
                events.push(data);
            }
        }
        self.partial_line.drain(..start);

        events
    }

    /// Flush a final unterminated line once the byte stream has ended
    pub fn finish(&mut self) -> Option<SseData> {
        let bytes = std::mem::take(&mut self.partial_line);
        self.parse_line(&String::from_utf8_lossy(&bytes))
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    fn parse_line(&mut self, line: &str) -> Option<SseData> {
        let line = line.trim_end_matches('\r');

        // Skip empty lines and SSE comments
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        // event:, id:, retry: carry nothing we need
        let data = line
            .strip_prefix("data: ")
            .or_else(|| line.strip_prefix("data:"))?;

        self.event_count += 1;

        if data.trim() == "[DONE]" {
            return Some(SseData::Done);
        }

        match serde_json::from_str::<Value>(data) {
            Ok(json) => Some(SseData::Json(json)),
            Err(_) => {
                if !data.trim().is_empty() {
                    warn!(
                        "Failed to parse SSE JSON (event #{}): {}",
                        self.event_count, data
                    );
                }
                None
            }
        }
    }
}

/// Error message carried by an in-band vendor error event
///
/// Anthropic sends `{"type":"error","error":{"message":...}}`; OpenAI-compatible
/// and Google endpoints send `{"error":{"message":...}}` or `{"error":"..."}`.
pub fn stream_error_message(json: &Value) -> Option<String> {
    let error = json.get("error")?;
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = error.as_str() {
        return Some(message.to_string());
    }
    Some("An error occurred during streaming".to_string())
}

struct SseState<S> {
    bytes: Pin<Box<S>>,
    lines: SseLineBuffer,
    pending: VecDeque<Result<Value, ChatError>>,
    provider: ProviderId,
    finished: bool,
    stream_start: Instant,
    bytes_received: usize,
}

impl<S> SseState<S> {
    /// Queue parsed payloads; returns false once the stream must stop
    fn enqueue(&mut self, data: SseData) -> bool {
        match data {
            SseData::Done => {
                info!(
                    "{} SSE [DONE] after {:?}, {} events, {} bytes",
                    self.provider,
                    self.stream_start.elapsed(),
                    self.lines.event_count(),
                    self.bytes_received
                );
                false
            }
            SseData::Json(json) => {
                if let Some(message) = stream_error_message(&json) {
                    warn!("{} stream error event: {}", self.provider, message);
                    self.pending
                        .push_back(Err(ChatError::stream_fault(self.provider, message)));
                    return false;
                }
                self.pending.push_back(Ok(json));
                true
            }
        }
    }
}

/// Adapt a raw SSE byte stream into vendor JSON events
///
/// Events are yielded in arrival order. A transport error or an in-band
/// error event is yielded as a single `StreamFault` after everything that
/// preceded it, then the stream ends. Dropping the returned stream drops
/// the byte stream and with it the underlying connection.
pub fn sse_json_stream<S, E>(
    bytes: S,
    provider: ProviderId,
) -> impl Stream<Item = Result<Value, ChatError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        lines: SseLineBuffer::new(),
        pending: VecDeque::new(),
        provider,
        finished: false,
        stream_start: Instant::now(),
        bytes_received: 0,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.bytes_received += chunk.len();
                    debug!(
                        "SSE chunk received: {} bytes (total: {} bytes)",
                        chunk.len(),
                        state.bytes_received
                    );
                    for data in state.lines.push(&chunk) {
                        if !state.enqueue(data) {
                            state.finished = true;
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("{} stream read error: {}", state.provider, e);
                    state.finished = true;
                    state
                        .pending
                        .push_back(Err(ChatError::stream_fault(state.provider, e.to_string())));
                }
                None => {
                    state.finished = true;
                    if let Some(data) = state.lines.finish() {
                        state.enqueue(data);
                    }
                    info!(
                        "{} stream ended after {:?}, {} events, {} bytes",
                        state.provider,
                        state.stream_start.elapsed(),
                        state.lines.event_count(),
                        state.bytes_received
                    );
                }
            }
        }
    })
}
