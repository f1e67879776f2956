//! Chorus Core - multi-provider LLM chat orchestration
//!
//! This crate provides:
//! - Provider adapters for Anthropic, OpenAI, Google and OpenRouter
//! - Normalization of streamed vendor chunks into text deltas
//! - Model-to-provider resolution and the available-model catalog
//! - Conversation history assembly with threshold summarization
//! - Conversation storage (in-memory and SQLite)

pub mod agent;
pub mod ai;
pub mod config;
pub mod constants;
pub mod error;
pub mod orchestrator;
pub mod paths;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use ai::{
    CallOptions, ChatMessage, ChatProvider, ChunkShape, ModelInfo, ProviderId, ProviderRegistry,
    ProviderStatus, Role, TextStream,
};
pub use config::ChorusConfig;
pub use error::ChatError;
pub use orchestrator::Orchestrator;
pub use storage::{ConversationStore, MemoryStore, SqliteStore, StoredMessage};
