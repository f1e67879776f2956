//! Conversation context for chat turns
//!
//! ## Components
//! - `HistoryAssembler` - Loads history and decides when to summarize
//! - `Summarizer` - Digests older turns with the fixed summarization model

pub mod history;
pub mod summarizer;

pub use history::HistoryAssembler;
pub use summarizer::{scrub_attachments, Summarizer};
