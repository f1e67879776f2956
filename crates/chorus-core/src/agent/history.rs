//! History assembly with threshold-triggered summarization
//!
//! Builds the message list sent to a model for one conversation. Long
//! conversations can have their older turns replaced by a digest; nothing
//! is ever truncated without one being attempted.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::summarizer::Summarizer;
use crate::ai::types::{ChatMessage, Role};
use crate::constants::history::SUMMARY_PREFIX;
use crate::error::ChatError;
use crate::storage::ConversationStore;

pub struct HistoryAssembler {
    store: Arc<dyn ConversationStore>,
    summarizer: Summarizer,
    threshold: usize,
}

impl HistoryAssembler {
    /// `threshold` is clamped to at least one message
    pub fn new(store: Arc<dyn ConversationStore>, summarizer: Summarizer, threshold: usize) -> Self {
        Self {
            store,
            summarizer,
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Assemble the history of `conversation_id`
    ///
    /// The stored system prompt (if any) leads the sequence and counts
    /// toward the threshold like any other message. At or below the
    /// threshold, or when `summarize` is false, the sequence is returned
    /// unchanged. Above it, everything but the last `threshold` messages is
    /// replaced by one summary message; if summarization fails only those
    /// recent messages are kept.
    pub async fn build_history(
        &self,
        conversation_id: &str,
        summarize: bool,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let system_prompt = self
            .store
            .load_system_prompt(conversation_id)
            .await?
            .filter(|p| !p.trim().is_empty());

        let mut stored = self.store.load_messages(conversation_id).await?;
        // stable: equal timestamps keep store order
        stored.sort_by_key(|m| m.created_at);

        let total = stored.len();
        let known: Vec<ChatMessage> = stored
            .into_iter()
            .filter_map(|m| Role::parse(&m.role).map(|role| ChatMessage::new(role, m.content)))
            .collect();
        if known.len() < total {
            debug!(
                "Skipped {} messages with unrecognized roles in {}",
                total - known.len(),
                conversation_id
            );
        }

        let mut messages = Vec::with_capacity(known.len() + 1);
        messages.extend(system_prompt.map(ChatMessage::system));
        messages.extend(known);

        if messages.len() <= self.threshold || !summarize {
            return Ok(messages);
        }

        let recent = messages.split_off(messages.len() - self.threshold);
        let older = messages;

        let mut history = Vec::with_capacity(recent.len() + 1);
        match self.summarizer.summarize(&older).await {
            Ok(digest) if !digest.is_empty() => {
                info!(
                    "Summarized {} older messages of {}, keeping {} recent",
                    older.len(),
                    conversation_id,
                    recent.len()
                );
                history.push(ChatMessage::system(format!("{}\n{}", SUMMARY_PREFIX, digest)));
            }
            Ok(_) => {
                warn!(
                    "Empty summary for {}; dropping {} older messages",
                    conversation_id,
                    older.len()
                );
            }
            Err(e) => {
                warn!(
                    "Summarization failed for {}: {}; dropping {} older messages",
                    conversation_id,
                    e,
                    older.len()
                );
            }
        }

        history.extend(recent);
        Ok(history)
    }
}
