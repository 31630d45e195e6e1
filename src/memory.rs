use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

/// One completed exchange. Immutable once appended; identity is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub timestamp: String,
    pub user: String,
    pub ai: String,
}

impl Turn {
    pub fn now(user: &str, ai: &str) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            user: user.to_string(),
            ai: ai.to_string(),
        }
    }
}

/// Durable, append-only chat transcript backed by a JSON file. The file is
/// rewritten in full after every append via a temp-file rename, so a reader
/// always sees either the pre-append or the fully-appended state.
pub struct ConversationLog {
    path: PathBuf,
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Loads prior history. Absent or unparseable storage yields an empty
    /// log; the file will be overwritten on the next successful append.
    pub async fn load(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let turns = match fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(turns) => turns,
                Err(e) => {
                    warn!("Chat history at {} is unreadable ({}), starting fresh", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self { path, turns }
    }

    pub async fn append(&mut self, turn: Turn) -> Result<()> {
        self.turns.push(turn);
        self.flush().await
    }

    async fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.turns)
            .context("Failed to serialize chat history")?;

        // Temp file in the same directory so the rename stays atomic.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write chat history to {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace chat history at {}", self.path.display()))?;

        Ok(())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.to_string(),
        }
    }
}

/// In-memory model context for one session. Rehydrated from the durable log
/// at startup so the model sees the same history across restarts; passed by
/// reference wherever model context is needed, dropped when the process ends.
#[derive(Default)]
pub struct SessionContext {
    messages: Vec<ChatMessage>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays each persisted turn as a user/assistant message pair.
    pub fn from_log(log: &ConversationLog) -> Self {
        let mut context = Self::new();
        for turn in log.turns() {
            context.push_exchange(&turn.user, &turn.ai);
        }
        context
    }

    pub fn push_exchange(&mut self, user: &str, ai: &str) {
        self.messages.push(ChatMessage::user(user));
        self.messages.push(ChatMessage::assistant(ai));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
