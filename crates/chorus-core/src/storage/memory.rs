//! In-process conversation store

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{ConversationStore, StoredMessage};
use crate::ai::types::Role;

#[derive(Debug, Default)]
struct Conversation {
    system_prompt: Option<String>,
    messages: Vec<StoredMessage>,
}

/// Conversations held in memory; unknown ids are created on first write
#[derive(Debug, Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_system_prompt(&self, conversation_id: &str, prompt: impl Into<String>) {
        self.conversations
            .write()
            .entry(conversation_id.to_string())
            .or_default()
            .system_prompt = Some(prompt.into());
    }

    /// Append a message with an arbitrary stored role
    pub fn push(&self, conversation_id: &str, message: StoredMessage) {
        self.conversations
            .write()
            .entry(conversation_id.to_string())
            .or_default()
            .messages
            .push(message);
    }

    pub fn message_count(&self, conversation_id: &str) -> usize {
        self.conversations
            .read()
            .get(conversation_id)
            .map_or(0, |c| c.messages.len())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>> {
        Ok(self
            .conversations
            .read()
            .get(conversation_id)
            .map(|c| c.messages.clone())
            .unwrap_or_default())
    }

    async fn load_system_prompt(&self, conversation_id: &str) -> Result<Option<String>> {
        Ok(self
            .conversations
            .read()
            .get(conversation_id)
            .and_then(|c| c.system_prompt.clone()))
    }

    async fn save_message(&self, conversation_id: &str, role: Role, content: &str) -> Result<()> {
        self.push(conversation_id, StoredMessage::new(role.as_str(), content));
        Ok(())
    }
}
