//! Command implementations

use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use chorus_core::ai::providers::get_model;
use chorus_core::{
    CallOptions, ChatMessage, ChorusConfig, ConversationStore, Orchestrator, ProviderStatus, Role,
    SqliteStore, TextStream,
};

pub struct App {
    orchestrator: Orchestrator,
    store: Arc<SqliteStore>,
}

/// How a streamed reply ended
#[derive(Debug, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed(String),
    Interrupted,
}

impl App {
    pub fn open(config_path: &Path, db_path: &Path) -> Result<Self> {
        let config = ChorusConfig::load_with_env(config_path)?;
        let store = Arc::new(
            SqliteStore::open(db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?,
        );
        let orchestrator = Orchestrator::from_config(&config, store.clone());
        Ok(Self {
            orchestrator,
            store,
        })
    }

    pub fn models(&self) -> Result<()> {
        let models = self.orchestrator.get_available_models();
        if models.is_empty() {
            println!("No providers configured. Set an API key, e.g. OPENAI_API_KEY.");
        }

        for (provider, ids) in &models {
            println!("{}:", provider);
            for id in ids {
                let name = get_model(id).map_or(id.as_str(), |m| m.display_name.as_str());
                println!("  {:<36} {}", id, name);
            }
        }

        for (provider, status) in self.orchestrator.registry().statuses() {
            if let ProviderStatus::Unavailable(reason) = status {
                println!("{} unavailable: {}", provider, reason);
            }
        }
        Ok(())
    }

    pub fn new_conversation(&self, title: &str, system_prompt: Option<&str>) -> Result<()> {
        let id = self.store.create_conversation(title, system_prompt)?;
        println!("{}", id);
        Ok(())
    }

    pub fn list(&self) -> Result<()> {
        let conversations = self.store.list_conversations()?;
        if conversations.is_empty() {
            println!("No conversations yet. Start one with `chorus new`.");
        }
        for c in conversations {
            println!(
                "{}  {:>4} msgs  {}  {}",
                c.id,
                c.message_count,
                c.updated_at.format("%Y-%m-%d %H:%M"),
                c.title
            );
        }
        Ok(())
    }

    /// Persist the user turn, stream the reply and persist it once complete
    pub async fn chat(
        &self,
        conversation_id: &str,
        model: &str,
        message: &str,
        summarize: bool,
    ) -> Result<()> {
        // Fail on unknown models before anything is written
        self.orchestrator.registry().resolve(model)?;

        self.store
            .save_message(conversation_id, Role::User, message)
            .await?;
        let history = self
            .orchestrator
            .get_message_history(conversation_id, summarize)
            .await?;

        let stream = self
            .orchestrator
            .stream_chat(model, &history, &CallOptions::default())?;
        let mut stdout = std::io::stdout();

        match stream_until_interrupted(stream, &mut stdout, signal::ctrl_c()).await? {
            StreamOutcome::Completed(reply) => {
                writeln!(stdout)?;
                if reply.is_empty() {
                    warn!("Empty reply from {} in {}", model, conversation_id);
                } else {
                    self.store
                        .save_message(conversation_id, Role::Assistant, &reply)
                        .await?;
                }
            }
            StreamOutcome::Interrupted => {
                writeln!(stdout)?;
                eprintln!("Interrupted; the partial reply was not saved.");
                info!("Chat in {} interrupted by user", conversation_id);
            }
        }
        Ok(())
    }

    pub async fn ask(&self, model: &str, prompt: &str) -> Result<()> {
        let reply = self
            .orchestrator
            .get_chat_completion(model, &[ChatMessage::user(prompt)], &CallOptions::default())
            .await?;
        println!("{}", reply);
        Ok(())
    }

    pub async fn history(&self, conversation_id: &str, summarize: bool) -> Result<()> {
        let history = self
            .orchestrator
            .get_message_history(conversation_id, summarize)
            .await?;
        for message in history {
            println!("[{}] {}", message.role(), message.content());
        }
        Ok(())
    }
}

/// Write deltas to `out` as they arrive until the stream ends or `interrupt` fires
///
/// On interrupt the stream is closed, releasing the provider connection.
/// A mid-stream fault is returned after the text printed so far.
pub async fn stream_until_interrupted<W, F>(
    mut stream: TextStream,
    out: &mut W,
    interrupt: F,
) -> Result<StreamOutcome>
where
    W: Write,
    F: std::future::Future,
{
    let mut reply = String::new();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                stream.close();
                return Ok(StreamOutcome::Interrupted);
            }
            delta = stream.next() => match delta {
                Some(Ok(text)) => {
                    out.write_all(text.as_bytes())?;
                    out.flush()?;
                    reply.push_str(&text);
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(StreamOutcome::Completed(reply)),
            }
        }
    }
}
