//! Scripted provider for unit tests
//!
//! Replays a fixed list of chunks on every call, records each request and
//! counts how many of its streams have been released.

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::ai::client::ChatProvider;
use crate::ai::normalize::ChunkShape;
use crate::ai::providers::ProviderId;
use crate::ai::stream::ChunkStream;
use crate::ai::types::{CallOptions, ChatMessage};
use crate::error::ChatError;

/// One recorded `stream_completion` call
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub options: CallOptions,
}

/// Chunk carrying `text` in the layout `provider` streams
pub fn text_chunk(provider: ProviderId, text: &str) -> Value {
    match provider.chunk_shape() {
        ChunkShape::DeltaText => {
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}})
        }
        ChunkShape::CandidateParts => {
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
        }
        ChunkShape::ChoicesDelta | ChunkShape::Auto => {
            json!({"choices": [{"index": 0, "delta": {"content": text}}]})
        }
    }
}

struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ScriptedProvider {
    id: ProviderId,
    chunks: Vec<Value>,
    fault_after: Option<usize>,
    requests: Mutex<Vec<CapturedRequest>>,
    released: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            chunks: Vec::new(),
            fault_after: None,
            requests: Mutex::new(Vec::new()),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reply with these text pieces, one chunk each
    pub fn with_reply(mut self, pieces: &[&str]) -> Self {
        self.chunks = pieces.iter().map(|p| text_chunk(self.id, p)).collect();
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<Value>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Fail with a `StreamFault` after `n` chunks
    pub fn with_fault_after(mut self, n: usize) -> Self {
        self.fault_after = Some(n);
        self
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Streams dropped or closed so far
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ChatProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn stream_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> ChunkStream {
        self.requests.lock().push(CapturedRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            options: options.clone(),
        });

        let mut items: Vec<Result<Value, ChatError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fault_after {
            items.truncate(n);
            items.push(Err(ChatError::stream_fault(self.id, "scripted fault")));
        }

        let guard = ReleaseGuard(self.released.clone());
        ChunkStream::new(stream::iter(items).map(move |item| {
            let _held = &guard;
            item
        }))
    }
}
