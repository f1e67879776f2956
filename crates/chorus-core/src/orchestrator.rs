//! Chat orchestration facade
//!
//! Single entry point for transports: resolves the provider for a model,
//! delegates streaming and one-shot completions, exposes the model
//! catalog and assembled conversation history.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::agent::{HistoryAssembler, Summarizer};
use crate::ai::providers::ProviderId;
use crate::ai::registry::ProviderRegistry;
use crate::ai::stream::TextStream;
use crate::ai::types::{CallOptions, ChatMessage};
use crate::config::ChorusConfig;
use crate::error::ChatError;
use crate::storage::ConversationStore;

pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    history: HistoryAssembler,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn ConversationStore>,
        threshold: usize,
    ) -> Self {
        let summarizer = Summarizer::new(registry.clone());
        Self {
            history: HistoryAssembler::new(store, summarizer, threshold),
            registry,
        }
    }

    /// Build the provider registry from `config` and wire everything up
    pub fn from_config(config: &ChorusConfig, store: Arc<dyn ConversationStore>) -> Self {
        let registry = Arc::new(ProviderRegistry::from_config(config));
        Self::new(registry, store, config.history.threshold)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Stream text deltas for a chat turn
    ///
    /// Unknown models and uninitialized providers fail here, before any
    /// request is made. Vendor failures arrive inside the stream at the
    /// point they happen.
    pub fn stream_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> Result<TextStream, ChatError> {
        let provider = self.registry.resolve(model)?;
        info!(
            "Streaming chat: model={}, provider={}, messages={}",
            model,
            provider.id(),
            messages.len()
        );
        Ok(provider.stream_text(model, messages, options))
    }

    /// One-shot completion; all-or-nothing on failure
    pub async fn get_chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> Result<String, ChatError> {
        let provider = self.registry.resolve(model)?;
        info!(
            "Chat completion: model={}, provider={}, messages={}",
            model,
            provider.id(),
            messages.len()
        );
        provider.full_completion(model, messages, options).await
    }

    /// Table models of every initialized provider
    pub fn get_available_models(&self) -> BTreeMap<ProviderId, Vec<String>> {
        self.registry.available_models()
    }

    pub async fn get_message_history(
        &self,
        conversation_id: &str,
        summarize: bool,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.history.build_history(conversation_id, summarize).await
    }
}
