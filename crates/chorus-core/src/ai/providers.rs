//! AI provider identities and the static model table
//!
//! Defines the closed set of supported vendors, the built-in model
//! catalog, and model-to-provider resolution with prefix inference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::ai::normalize::ChunkShape;
use crate::error::ChatError;

/// Unique identifier for each supported provider
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Google,
    OpenRouter,
}

impl ProviderId {
    /// All providers in catalog order
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::Anthropic,
            ProviderId::OpenAI,
            ProviderId::Google,
            ProviderId::OpenRouter, // aggregator, always last
        ]
    }

    /// Key used in config files and logs
    pub fn storage_key(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenAI => "openai",
            ProviderId::Google => "google",
            ProviderId::OpenRouter => "open_router",
        }
    }

    /// Environment variables checked for an API key, in order
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderId::Anthropic => &["ANTHROPIC_API_KEY"],
            ProviderId::OpenAI => &["OPENAI_API_KEY"],
            ProviderId::Google => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderId::OpenRouter => &["OPENROUTER_API_KEY"],
        }
    }

    /// Endpoint used when the config does not override it
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "https://api.anthropic.com/v1",
            ProviderId::OpenAI => "https://api.openai.com/v1",
            ProviderId::Google => "https://generativelanguage.googleapis.com/v1beta",
            ProviderId::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Shape of the streamed chunks this provider emits
    pub fn chunk_shape(&self) -> ChunkShape {
        match self {
            ProviderId::Anthropic => ChunkShape::DeltaText,
            ProviderId::OpenAI | ProviderId::OpenRouter => ChunkShape::ChoicesDelta,
            ProviderId::Google => ChunkShape::CandidateParts,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Anthropic => write!(f, "Anthropic"),
            ProviderId::OpenAI => write!(f, "OpenAI"),
            ProviderId::Google => write!(f, "Google"),
            ProviderId::OpenRouter => write!(f, "OpenRouter"),
        }
    }
}

/// Information about a model in the static table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model ID to send in API requests
    pub id: String,
    /// Human-readable display name
    pub display_name: String,
    pub provider: ProviderId,
    /// Context window size in tokens
    pub context_window: usize,
    /// Maximum output tokens
    pub max_output: usize,
}

impl ModelInfo {
    pub fn new(
        id: &str,
        display_name: &str,
        provider: ProviderId,
        context_window: usize,
        max_output: usize,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            provider,
            context_window,
            max_output,
        }
    }
}

/// Built-in model table, grouped by provider in catalog order
static MODEL_TABLE: LazyLock<Vec<ModelInfo>> = LazyLock::new(|| {
    use ProviderId::*;
    vec![
        // Anthropic
        ModelInfo::new("claude-opus-4-5-20251101", "Claude Opus 4.5", Anthropic, 200_000, 32_000),
        ModelInfo::new("claude-sonnet-4-5-20250929", "Claude Sonnet 4.5", Anthropic, 200_000, 64_000),
        ModelInfo::new("claude-haiku-4-5-20251001", "Claude Haiku 4.5", Anthropic, 200_000, 64_000),
        ModelInfo::new("claude-sonnet-4-20250514", "Claude Sonnet 4", Anthropic, 200_000, 64_000),
        // OpenAI
        ModelInfo::new("gpt-4o", "GPT-4o", OpenAI, 128_000, 16_384),
        ModelInfo::new("gpt-4o-mini", "GPT-4o Mini", OpenAI, 128_000, 16_384),
        ModelInfo::new("gpt-4.1", "GPT-4.1", OpenAI, 1_047_576, 32_768),
        ModelInfo::new("o3", "OpenAI o3", OpenAI, 200_000, 100_000),
        ModelInfo::new("o4-mini", "OpenAI o4-mini", OpenAI, 200_000, 100_000),
        // Google
        ModelInfo::new("gemini-2.5-pro", "Gemini 2.5 Pro", Google, 1_048_576, 65_536),
        ModelInfo::new("gemini-2.5-flash", "Gemini 2.5 Flash", Google, 1_048_576, 65_536),
        ModelInfo::new("gemini-2.0-flash", "Gemini 2.0 Flash", Google, 1_048_576, 8_192),
        // OpenRouter
        ModelInfo::new("meta-llama/llama-4-maverick", "Llama 4 Maverick", OpenRouter, 1_000_000, 16_384),
        ModelInfo::new("deepseek/deepseek-chat-v3-0324", "DeepSeek V3", OpenRouter, 64_000, 8_192),
        ModelInfo::new("qwen/qwen3-235b-a22b", "Qwen 3 235B", OpenRouter, 128_000, 8_192),
    ]
});

/// Prefix rules for models absent from the table, checked in order
const PREFIX_RULES: &[(&str, ProviderId)] = &[
    ("claude-", ProviderId::Anthropic),
    ("gpt-", ProviderId::OpenAI),
    ("chatgpt-", ProviderId::OpenAI),
    ("o1", ProviderId::OpenAI),
    ("o3", ProviderId::OpenAI),
    ("o4", ProviderId::OpenAI),
    ("gemini-", ProviderId::Google),
    ("anthropic/", ProviderId::OpenRouter),
    ("openai/", ProviderId::OpenRouter),
    ("google/", ProviderId::OpenRouter),
    ("meta-llama/", ProviderId::OpenRouter),
    ("deepseek/", ProviderId::OpenRouter),
    ("mistralai/", ProviderId::OpenRouter),
    ("qwen/", ProviderId::OpenRouter),
];

/// The whole static table (cached, no allocation)
pub fn builtin_models() -> &'static [ModelInfo] {
    &MODEL_TABLE
}

/// Table entry for a model id
pub fn get_model(model_id: &str) -> Option<&'static ModelInfo> {
    MODEL_TABLE.iter().find(|m| m.id == model_id)
}

/// Table entries for one provider, in table order
pub fn models_for(provider: ProviderId) -> impl Iterator<Item = &'static ModelInfo> {
    MODEL_TABLE.iter().filter(move |m| m.provider == provider)
}

/// Every model id in the table
pub fn known_model_ids() -> Vec<String> {
    MODEL_TABLE.iter().map(|m| m.id.clone()).collect()
}

/// Infer a provider from the model id's prefix
pub fn infer_provider(model_id: &str) -> Option<ProviderId> {
    PREFIX_RULES
        .iter()
        .find(|(prefix, _)| model_id.starts_with(prefix))
        .map(|(_, provider)| *provider)
}

/// Resolve a model id to its provider
///
/// Table lookup first, then prefix inference. Never falls back to a default.
pub fn resolve_provider(model_id: &str) -> Result<ProviderId, ChatError> {
    if let Some(model) = get_model(model_id) {
        return Ok(model.provider);
    }
    if let Some(provider) = infer_provider(model_id) {
        tracing::debug!("Inferred provider {} for model {} by prefix", provider, model_id);
        return Ok(provider);
    }
    Err(ChatError::UnsupportedModel {
        model: model_id.to_string(),
        known: known_model_ids(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_display() {
        assert_eq!(ProviderId::Anthropic.to_string(), "Anthropic");
        assert_eq!(ProviderId::OpenAI.to_string(), "OpenAI");
        assert_eq!(ProviderId::Google.to_string(), "Google");
        assert_eq!(ProviderId::OpenRouter.to_string(), "OpenRouter");
    }

    #[test]
    fn test_storage_keys_match_serde() {
        for provider in ProviderId::all() {
            let json = serde_json::to_string(provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.storage_key()));
        }
    }

    #[test]
    fn test_every_table_model_resolves_to_its_provider() {
        for model in builtin_models() {
            assert_eq!(resolve_provider(&model.id).unwrap(), model.provider, "{}", model.id);
        }
    }

    #[test]
    fn test_table_ids_are_unique() {
        let mut ids = known_model_ids();
        let len = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn test_prefix_inference() {
        assert_eq!(resolve_provider("claude-3-7-sonnet-latest").unwrap(), ProviderId::Anthropic);
        assert_eq!(resolve_provider("gpt-5").unwrap(), ProviderId::OpenAI);
        assert_eq!(resolve_provider("o1-preview").unwrap(), ProviderId::OpenAI);
        assert_eq!(resolve_provider("gemini-1.5-pro").unwrap(), ProviderId::Google);
        assert_eq!(
            resolve_provider("anthropic/claude-sonnet-4").unwrap(),
            ProviderId::OpenRouter
        );
        assert_eq!(
            resolve_provider("mistralai/mistral-large").unwrap(),
            ProviderId::OpenRouter
        );
    }

    #[test]
    fn test_table_wins_over_prefix() {
        // o4-mini would also match the "o4" rule; the table entry decides
        assert!(get_model("o4-mini").is_some());
        assert_eq!(resolve_provider("o4-mini").unwrap(), ProviderId::OpenAI);
    }

    #[test]
    fn test_unknown_model_is_unsupported() {
        match resolve_provider("llama3:8b") {
            Err(ChatError::UnsupportedModel { model, known }) => {
                assert_eq!(model, "llama3:8b");
                assert_eq!(known, known_model_ids());
                assert!(known.contains(&"gpt-4o".to_string()));
            }
            other => panic!("Expected UnsupportedModel, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_is_literal_not_substring() {
        assert!(resolve_provider("my-claude-model").is_err());
        assert!(resolve_provider("").is_err());
    }

    #[test]
    fn test_models_for_provider() {
        let google: Vec<_> = models_for(ProviderId::Google).map(|m| m.id.as_str()).collect();
        assert_eq!(google, vec!["gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.0-flash"]);
    }

    #[test]
    fn test_chunk_shapes() {
        assert_eq!(ProviderId::Anthropic.chunk_shape(), ChunkShape::DeltaText);
        assert_eq!(ProviderId::OpenRouter.chunk_shape(), ChunkShape::ChoicesDelta);
    }
}
