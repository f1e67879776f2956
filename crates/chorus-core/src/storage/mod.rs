//! Conversation persistence
//!
//! The orchestration core reads history through `ConversationStore` and
//! never mutates persisted messages. Two implementations:
//! - `MemoryStore` for tests and ephemeral sessions
//! - `SqliteStore` for the CLI, backed by a versioned SQLite schema

mod conversations;
mod database;
mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ai::types::Role;

pub use conversations::{ConversationSummary, SqliteStore};
pub use database::Database;
pub use memory::MemoryStore;

/// A persisted message as the store returns it
///
/// `role` is kept as stored; roles the core does not recognize are
/// filtered out when history is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Read/write boundary to wherever conversations live
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All messages of a conversation in creation order
    async fn load_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>>;

    /// The conversation's system prompt, if one was set
    async fn load_system_prompt(&self, conversation_id: &str) -> Result<Option<String>>;

    /// Append a message to a conversation
    async fn save_message(&self, conversation_id: &str, role: Role, content: &str) -> Result<()>;
}
