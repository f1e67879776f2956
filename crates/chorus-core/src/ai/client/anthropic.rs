//! Anthropic Messages API adapter
//!
//! System messages move into the top-level `system` field and
//! `max_tokens` is always sent because the API requires it.

use serde_json::{json, Value};

use super::core::{AuthHeader, HttpTransport};
use super::ChatProvider;
use crate::ai::providers::{get_model, ProviderId};
use crate::ai::stream::ChunkStream;
use crate::ai::types::{split_system, CallOptions, ChatMessage};
use crate::config::ProviderSettings;
use crate::constants;
use crate::error::ChatError;

pub struct AnthropicProvider {
    transport: HttpTransport,
}

impl AnthropicProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ChatError> {
        let transport = HttpTransport::new(ProviderId::Anthropic, settings, AuthHeader::XApiKey)?
            .with_header("anthropic-version", constants::ai::ANTHROPIC_API_VERSION);
        Ok(Self { transport })
    }

    /// Caller cap, else the model's table limit, else the global default
    fn max_tokens(model: &str, options: &CallOptions) -> usize {
        options
            .max_tokens
            .or_else(|| get_model(model).map(|m| m.max_output))
            .unwrap_or(constants::ai::DEFAULT_MAX_TOKENS)
    }

    pub(crate) fn request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> Value {
        let (system, turns) = split_system(messages);
        let messages: Vec<Value> = turns
            .iter()
            .map(|m| json!({"role": m.role().as_str(), "content": m.content()}))
            .collect();

        let mut body = json!({
            "model": model,
            "max_tokens": Self::max_tokens(model, options),
            "messages": messages,
            "stream": true,
        });

        if let Some(system) = system {
            body["system"] = json!(system);
        }

        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }
}

impl ChatProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn stream_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> ChunkStream {
        let body = self.request_body(model, messages, options);
        self.transport.stream_json(self.transport.url("messages"), body)
    }
}
