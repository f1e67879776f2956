//! Application constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Streaming timeout - long completions can keep an SSE stream open for minutes
    pub const STREAM_TIMEOUT: Duration = Duration::from_secs(600);

    /// User agent sent to every provider
    pub const USER_AGENT: &str = "Chorus/0.1";
}

/// AI/LLM configuration
pub mod ai {
    /// Output token cap used when neither the caller nor the model table gives one
    pub const DEFAULT_MAX_TOKENS: usize = 4096;

    /// Anthropic API version header value
    pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
}

/// Conversation history configuration
pub mod history {
    /// Conversations longer than this many messages are eligible for summarization
    pub const SUMMARY_THRESHOLD: usize = 20;

    /// Prefix of the synthetic system message carrying the digest of older turns
    pub const SUMMARY_PREFIX: &str = "Summary of the earlier conversation:";
}

/// Summarization model, fixed for every conversation
pub mod summary {
    use crate::ai::providers::ProviderId;

    pub const PROVIDER: ProviderId = ProviderId::OpenAI;

    pub const MODEL: &str = "gpt-4o-mini";

    /// Digests are short bullet lists
    pub const MAX_TOKENS: usize = 1024;

    pub const TEMPERATURE: f32 = 0.2;

    /// Stand-in for images, data URIs and attachment markers in the transcript
    pub const ATTACHMENT_PLACEHOLDER: &str = "[attachment]";
}

/// Local directory layout
pub mod dirs {
    /// Config directory name under the user's home
    pub const CONFIG_DIR_NAME: &str = ".chorus";

    pub const CONFIG_FILE_NAME: &str = "config.toml";

    pub const DATABASE_FILE_NAME: &str = "chorus.db";

    pub const LOG_FILE_NAME: &str = "chorus.log";
}
