//! SQLite database wrapper with versioned migrations

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// SQLite database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path and migrate it
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets a second CLI instance read while one is streaming
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get the current schema version from database
    pub(crate) fn get_schema_version(&self) -> i32 {
        if let Err(e) = self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        ) {
            tracing::warn!("Failed to create schema_version table: {}", e);
            return 0;
        }

        self.conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0)
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn
            .execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        Ok(())
    }

    /// Run database migrations incrementally
    pub(crate) fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version();
        info!(
            "Database schema version: {} (target: {})",
            current_version, SCHEMA_VERSION
        );

        if current_version >= SCHEMA_VERSION {
            return Ok(());
        }

        // Migration 1: Conversations and messages
        if current_version < 1 {
            info!("Running migration 1: Initial schema");
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS conversations (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    system_prompt TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS messages (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    conversation_id TEXT NOT NULL,
                    role TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_messages_conversation
                    ON messages(conversation_id);
                "#,
            )?;
            self.set_schema_version(1)?;
        }

        // Migration 2: History loads order by creation time
        if current_version < 2 {
            info!("Running migration 2: Message ordering index");
            self.conn.execute_batch(
                r#"
                CREATE INDEX IF NOT EXISTS idx_messages_conversation_created
                    ON messages(conversation_id, created_at, id);

                CREATE INDEX IF NOT EXISTS idx_conversations_updated
                    ON conversations(updated_at DESC);
                "#,
            )?;
            self.set_schema_version(2)?;
        }

        info!("Migrations complete");
        Ok(())
    }
}
