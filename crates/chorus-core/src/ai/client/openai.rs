//! OpenAI Chat Completions adapter
//!
//! Also serves OpenAI-compatible aggregators (OpenRouter), which share the
//! wire format and differ only in endpoint and provider tag.

use serde_json::{json, Value};

use super::core::{AuthHeader, HttpTransport};
use super::ChatProvider;
use crate::ai::providers::ProviderId;
use crate::ai::stream::ChunkStream;
use crate::ai::types::{CallOptions, ChatMessage};
use crate::config::ProviderSettings;
use crate::error::ChatError;

pub struct OpenAiProvider {
    transport: HttpTransport,
}

impl OpenAiProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ChatError> {
        Self::with_id(ProviderId::OpenAI, settings)
    }

    pub fn open_router(settings: &ProviderSettings) -> Result<Self, ChatError> {
        Self::with_id(ProviderId::OpenRouter, settings)
    }

    fn with_id(provider: ProviderId, settings: &ProviderSettings) -> Result<Self, ChatError> {
        Ok(Self {
            transport: HttpTransport::new(provider, settings, AuthHeader::Bearer)?,
        })
    }

    pub(crate) fn request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> Value {
        // System messages stay inline, in their original position
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({"role": m.role().as_str(), "content": m.content()}))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "stream": true,
        });

        if let Some(max_tokens) = options.max_tokens {
            // Reasoning models reject the legacy max_tokens on api.openai.com
            let key = match self.transport.provider() {
                ProviderId::OpenAI => "max_completion_tokens",
                _ => "max_tokens",
            };
            body[key] = json!(max_tokens);
        }

        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }
}

impl ChatProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        self.transport.provider()
    }

    fn stream_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> ChunkStream {
        let body = self.request_body(model, messages, options);
        self.transport
            .stream_json(self.transport.url("chat/completions"), body)
    }
}
