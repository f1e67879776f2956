//! SQLite-backed conversation store

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use tracing::debug;

use super::database::Database;
use super::{ConversationStore, StoredMessage};
use crate::ai::types::Role;

/// Listing entry for a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

pub struct SqliteStore {
    db: Mutex<Database>,
}

/// Fixed-width timestamps so text ordering matches time ordering
fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp in database: {}", value))?
        .with_timezone(&Utc))
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::new(path)?))
    }

    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Create a conversation and return its id
    pub fn create_conversation(&self, title: &str, system_prompt: Option<&str>) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp(Utc::now());
        let system_prompt = system_prompt.map(str::trim).filter(|p| !p.is_empty());

        self.db.lock().conn().execute(
            "INSERT INTO conversations (id, title, system_prompt, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, title, system_prompt, now],
        )?;

        debug!("Created conversation {}", id);
        Ok(id)
    }

    /// All conversations, most recently updated first
    pub fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let db = self.db.lock();
        let mut stmt = db.conn().prepare(
            "SELECT c.id, c.title, c.created_at, c.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id)
             FROM conversations c
             ORDER BY c.updated_at DESC, c.created_at DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, title, created_at, updated_at, count)| {
                Ok(ConversationSummary {
                    id,
                    title,
                    created_at: parse_timestamp(&created_at)?,
                    updated_at: parse_timestamp(&updated_at)?,
                    message_count: count.max(0) as usize,
                })
            })
            .collect()
    }

    fn conversation_exists(db: &Database, conversation_id: &str) -> Result<bool> {
        Ok(db
            .conn()
            .query_row(
                "SELECT 1 FROM conversations WHERE id = ?1",
                [conversation_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn load_messages(&self, conversation_id: &str) -> Result<Vec<StoredMessage>> {
        let db = self.db.lock();
        let mut stmt = db.conn().prepare(
            "SELECT role, content, created_at FROM messages
             WHERE conversation_id = ?1
             ORDER BY created_at, id",
        )?;

        let rows = stmt
            .query_map([conversation_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(role, content, created_at)| {
                Ok(StoredMessage {
                    role,
                    content,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    async fn load_system_prompt(&self, conversation_id: &str) -> Result<Option<String>> {
        let prompt = self
            .db
            .lock()
            .conn()
            .query_row(
                "SELECT system_prompt FROM conversations WHERE id = ?1",
                [conversation_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(prompt.flatten())
    }

    async fn save_message(&self, conversation_id: &str, role: Role, content: &str) -> Result<()> {
        let db = self.db.lock();
        if !Self::conversation_exists(&db, conversation_id)? {
            bail!("Conversation not found: {}", conversation_id);
        }

        let now = timestamp(Utc::now());
        db.conn().execute(
            "INSERT INTO messages (conversation_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![conversation_id, role.as_str(), content, now],
        )?;
        db.conn().execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, conversation_id],
        )?;
        Ok(())
    }
}
