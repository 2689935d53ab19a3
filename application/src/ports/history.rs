//! Conversation history port

use async_trait::async_trait;

/// Per-channel conversation memory.
///
/// Appends are fire-and-forget value inserts; there is no read-modify-write
/// contention within a turn.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one line, attributed to an author (user display name or
    /// persona name)
    async fn append(&self, channel_id: &str, author: &str, text: &str);

    /// Load up to `limit` recent lines, most-recent-last
    async fn load(&self, channel_id: &str, limit: usize) -> Vec<String>;

    /// Drop all history for a channel
    async fn clear(&self, channel_id: &str);
}
