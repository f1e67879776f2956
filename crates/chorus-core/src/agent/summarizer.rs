//! Conversation digest for long histories
//!
//! Always runs against one fixed provider/model (`constants::summary`),
//! independent of the model the conversation itself uses. Attachments are
//! scrubbed from the transcript before it leaves the process.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::ai::registry::ProviderRegistry;
use crate::ai::types::{CallOptions, ChatMessage, Role};
use crate::constants::summary;
use crate::error::ChatError;

/// System prompt for summarization
const SUMMARIZATION_SYSTEM_PROMPT: &str = r#"You summarize the earlier part of a conversation so it can continue without the full transcript.

Respond with concise bullet points, one fact per bullet:
- What the user asked for and any constraints they gave
- Decisions, answers and conclusions reached
- Open questions or unfinished requests

Only state what the transcript says. Do not invent details, speculate, or add advice. Attachments appear as [attachment]; do not guess their contents."#;

/// Attachment references, applied in order
///
/// Markdown images first so an image whose target is a data URI is
/// replaced as a whole.
static ATTACHMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // ![alt](url)
        r"!\[[^\]]*\]\([^)]*\)",
        // <img ...>
        r"(?i)<img\b[^>]*>",
        // data:image/png;base64,....
        r"data:[\w/+.-]+;base64,[A-Za-z0-9+/=]+",
        // [attachment: x], [Image: x], [PDF: x], [file]
        r"(?i)\[(?:attachment|image|file|pdf)\b[^\]]*\]",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Replace embedded images, data URIs and attachment markers with a placeholder
pub fn scrub_attachments(text: &str) -> String {
    ATTACHMENT_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, re| {
            re.replace_all(&acc, summary::ATTACHMENT_PLACEHOLDER)
                .into_owned()
        })
}

/// Role-prefixed, scrubbed transcript, one message per paragraph
pub fn build_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let label = match m.role() {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
                Role::System => "SYSTEM",
            };
            format!("{}: {}", label, scrub_attachments(m.content()))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds digests of older conversation turns
#[derive(Debug, Clone)]
pub struct Summarizer {
    registry: Arc<ProviderRegistry>,
}

impl Summarizer {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Whether the fixed summarization provider was initialized
    pub fn is_available(&self) -> bool {
        self.registry.is_available(summary::PROVIDER)
    }

    /// Summarize `messages` into a bullet digest
    ///
    /// Fails with `SummarizationUnavailable` when the fixed provider has no
    /// adapter, or with the provider's own error if the call fails.
    pub async fn summarize(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let provider = self.registry.get(summary::PROVIDER).ok_or_else(|| {
            ChatError::SummarizationUnavailable {
                provider: summary::PROVIDER,
                model: summary::MODEL.to_string(),
            }
        })?;

        let request = [
            ChatMessage::system(SUMMARIZATION_SYSTEM_PROMPT),
            ChatMessage::user(build_transcript(messages)),
        ];
        let options = CallOptions::default()
            .with_max_tokens(summary::MAX_TOKENS)
            .with_temperature(summary::TEMPERATURE);

        info!(
            "Summarizing {} messages with {} {}",
            messages.len(),
            summary::PROVIDER,
            summary::MODEL
        );
        let digest = provider
            .full_completion(summary::MODEL, &request, &options)
            .await?;
        debug!("Summary is {} chars", digest.len());

        Ok(digest.trim().to_string())
    }
}
