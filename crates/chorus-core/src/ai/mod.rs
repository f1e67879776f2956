//! AI provider layer
//!
//! Handles communication with AI providers (Anthropic, OpenAI, Google, OpenRouter).
//! Supports three wire formats, normalized to one stream of text deltas.

// Provider adapters
pub mod client;

// Provider catalog and dispatch
pub mod providers;
pub mod registry;

// Shared infrastructure
pub mod normalize;
pub mod sse;
pub mod stream;
pub mod types;

pub use client::ChatProvider;
pub use normalize::{extract_delta, ChunkShape};
pub use providers::{resolve_provider, ModelInfo, ProviderId};
pub use registry::{ProviderRegistry, ProviderStatus};
pub use stream::{ChunkStream, StreamChunk, TextStream};
pub use types::{CallOptions, ChatMessage, Role};
