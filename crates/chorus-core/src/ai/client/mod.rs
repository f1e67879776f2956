//! Provider adapters
//!
//! Each adapter translates canonical messages into one vendor's streaming
//! API. All of them share `HttpTransport` for auth, timeouts and SSE.

pub mod anthropic;
pub mod core;
pub mod google;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::ai::normalize::ChunkShape;
use crate::ai::providers::ProviderId;
use crate::ai::stream::{ChunkStream, TextStream};
use crate::ai::types::{CallOptions, ChatMessage};
use crate::config::ProviderSettings;
use crate::error::ChatError;

pub use self::anthropic::AnthropicProvider;
pub use self::core::{AuthHeader, HttpTransport};
pub use self::google::GoogleProvider;
pub use self::openai::OpenAiProvider;

/// One LLM vendor behind the canonical chat interface
///
/// Implementations hold only static configuration and are shared across
/// concurrent requests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Layout of the chunks `stream_completion` yields
    fn chunk_shape(&self) -> ChunkShape {
        self.id().chunk_shape()
    }

    /// Start a completion as a cold stream of vendor-shaped chunks
    ///
    /// No request is made until the stream is first polled. Vendor failures
    /// arrive as an `Err` item at the point they happen.
    fn stream_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> ChunkStream;

    /// Same call as `stream_completion`, normalized to text deltas
    fn stream_text(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> TextStream {
        TextStream::new(
            self.stream_completion(model, messages, options),
            self.chunk_shape(),
        )
    }

    /// Drain a completion and return the concatenated text
    ///
    /// All-or-nothing: a fault discards whatever text preceded it.
    async fn full_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> Result<String, ChatError> {
        self.stream_text(model, messages, options).collect_text().await
    }
}

/// Construct the adapter for `provider` from its settings
pub fn build_provider(
    provider: ProviderId,
    settings: &ProviderSettings,
) -> Result<Arc<dyn ChatProvider>, ChatError> {
    let adapter: Arc<dyn ChatProvider> = match provider {
        ProviderId::Anthropic => Arc::new(AnthropicProvider::new(settings)?),
        ProviderId::OpenAI => Arc::new(OpenAiProvider::new(settings)?),
        ProviderId::OpenRouter => Arc::new(OpenAiProvider::open_router(settings)?),
        ProviderId::Google => Arc::new(GoogleProvider::new(settings)?),
    };
    Ok(adapter)
}
