//! Chorus - chat with many LLM providers from the terminal
//!
//! Conversations are stored in `~/.chorus/chorus.db`; provider keys come
//! from `~/.chorus/config.toml` or the usual `*_API_KEY` variables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chorus_core::paths;

mod commands;

use commands::App;

/// Chorus - multi-provider chat
#[derive(Parser, Debug)]
#[command(name = "chorus")]
#[command(about = "Stream chat completions from many LLM providers", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.chorus/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Conversation database (defaults to ~/.chorus/chorus.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List models of every configured provider
    Models,

    /// Create a conversation and print its id
    New {
        #[arg(short, long, default_value = "New conversation")]
        title: String,

        /// System prompt prepended to every turn
        #[arg(short, long)]
        system_prompt: Option<String>,
    },

    /// List conversations, most recent first
    List,

    /// Send a message in a conversation and stream the reply
    Chat {
        conversation: String,

        #[arg(short, long)]
        model: String,

        /// Send the full history even when it is long
        #[arg(long)]
        no_summarize: bool,

        message: String,
    },

    /// One-shot question without a conversation
    Ask {
        #[arg(short, long)]
        model: String,

        prompt: String,
    },

    /// Print the history a chat turn would send
    History {
        conversation: String,

        /// Apply summarization above the threshold
        #[arg(long)]
        summarize: bool,
    },
}

/// Append to the log so earlier runs are kept
fn open_log(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

/// Log to a file so output never interleaves with streamed replies
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_file =
        std::fs::create_dir_all(paths::logs_dir()).and_then(|_| open_log(&paths::log_file()));

    match log_file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    tracing::info!("chorus {:?}", cli.command);

    let app = App::open(
        &cli.config.unwrap_or_else(paths::config_file),
        &cli.db.unwrap_or_else(paths::database_file),
    )?;

    match cli.command {
        Commands::Models => app.models(),
        Commands::New {
            title,
            system_prompt,
        } => app.new_conversation(&title, system_prompt.as_deref()),
        Commands::List => app.list(),
        Commands::Chat {
            conversation,
            model,
            no_summarize,
            message,
        } => app.chat(&conversation, &model, &message, !no_summarize).await,
        Commands::Ask { model, prompt } => app.ask(&model, &prompt).await,
        Commands::History {
            conversation,
            summarize,
        } => app.history(&conversation, summarize).await,
    }
}
