//! Pull-based completion streams
//!
//! `ChunkStream` carries vendor-shaped chunks; `TextStream` carries the
//! normalized text deltas. Both are cold (nothing happens until the first
//! poll), forward-only, and end permanently after an error. `close()` or
//! dropping the stream releases the vendor connection right away.

use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use crate::ai::normalize::{extract_delta, ChunkShape};
use crate::error::ChatError;

/// A single vendor-shaped stream event
pub type StreamChunk = Value;

/// Stream of vendor-shaped chunks from one completion call
pub struct ChunkStream {
    inner: Option<BoxStream<'static, Result<StreamChunk, ChatError>>>,
}

impl ChunkStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamChunk, ChatError>> + Send + 'static,
    {
        Self {
            inner: Some(stream.boxed()),
        }
    }

    /// Stream that fails on first pull
    pub fn failed(error: ChatError) -> Self {
        Self::new(futures::stream::once(async move { Err(error) }))
    }

    /// Stop the stream and release the underlying connection
    ///
    /// Further polls yield `None`. Calling it twice is a no-op.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!("Chunk stream closed by consumer");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl Stream for ChunkStream {
    type Item = Result<StreamChunk, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Err(e))) => {
                // Forward-only: nothing follows a fault
                this.inner = None;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.inner = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Stream of normalized, non-empty text deltas
#[derive(Debug)]
pub struct TextStream {
    chunks: ChunkStream,
    shape: ChunkShape,
}

impl TextStream {
    pub fn new(chunks: ChunkStream, shape: ChunkShape) -> Self {
        Self { chunks, shape }
    }

    /// Stop the stream and release the underlying connection
    pub fn close(&mut self) {
        self.chunks.close();
    }

    pub fn is_closed(&self) -> bool {
        self.chunks.is_closed()
    }

    /// Drain the stream, concatenating every delta
    ///
    /// All-or-nothing: on a fault the partial text is discarded.
    pub async fn collect_text(mut self) -> Result<String, ChatError> {
        let mut text = String::new();
        while let Some(delta) = self.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }
}

impl Stream for TextStream {
    type Item = Result<String, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.chunks.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let delta = extract_delta(&chunk, this.shape);
                    // pings, stop events and role-only chunks carry no text
                    if !delta.is_empty() {
                        return Poll::Ready(Some(Ok(delta)));
                    }
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
