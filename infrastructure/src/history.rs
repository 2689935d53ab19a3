//! In-memory conversation store
//!
//! Per-channel ring of "author: text" lines with a fixed cap. Appends are
//! value inserts; nothing reads back what it just wrote within a turn.

use async_trait::async_trait;
use chorus_application::ports::history::ConversationStore;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Bounded per-channel conversation memory
pub struct InMemoryConversationStore {
    channels: RwLock<HashMap<String, VecDeque<String>>>,
    cap: usize,
}

impl InMemoryConversationStore {
    /// `cap` is the number of lines retained per channel
    pub fn new(cap: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            cap,
        }
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, channel_id: &str, author: &str, text: &str) {
        let mut channels = self.channels.write().await;
        let lines = channels.entry(channel_id.to_string()).or_default();
        lines.push_back(format!("{author}: {text}"));
        while lines.len() > self.cap {
            lines.pop_front();
        }
    }

    async fn load(&self, channel_id: &str, limit: usize) -> Vec<String> {
        let channels = self.channels.read().await;
        match channels.get(channel_id) {
            Some(lines) => {
                let start = lines.len().saturating_sub(limit);
                lines.iter().skip(start).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    async fn clear(&self, channel_id: &str) {
        self.channels.write().await.remove(channel_id);
    }
}
