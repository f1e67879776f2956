//! Chat orchestration error types

use thiserror::Error;

use crate::ai::providers::ProviderId;

/// Errors surfaced by the orchestration core
#[derive(Debug, Error)]
pub enum ChatError {
    /// No table entry and no prefix rule matched the model id
    #[error("unsupported model '{model}' (known models: {})", known.join(", "))]
    UnsupportedModel { model: String, known: Vec<String> },

    /// The model resolved to a provider whose adapter was never constructed
    #[error("provider {provider} is not available for model '{model}' (no credential configured)")]
    ProviderUnavailable { provider: ProviderId, model: String },

    /// Adapter construction without a credential
    #[error("no credential configured for {provider}")]
    MissingCredential { provider: ProviderId },

    /// Vendor-side failure while opening or reading a stream
    #[error("{provider} stream failed{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    StreamFault {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },

    /// The fixed summarization provider has no adapter
    #[error("summarization provider {provider} is not available (model '{model}')")]
    SummarizationUnavailable { provider: ProviderId, model: String },

    /// Conversation store failure
    #[error("conversation store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ChatError {
    pub fn stream_fault(provider: ProviderId, message: impl Into<String>) -> Self {
        ChatError::StreamFault {
            provider,
            status: None,
            message: message.into(),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::StreamFault { .. } | ChatError::Store(_))
    }
}
