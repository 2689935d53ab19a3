//! Console transport adapter
//!
//! Drives the REPL: persona messages print under their speaker's name, the
//! thinking indicator is a transient status line, and "private channels"
//! are just per-user channel ids tracked locally.

use async_trait::async_trait;
use chorus_application::ports::transport::{IndicatorHandle, Transport, TransportError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Stdout-backed transport for local sessions
pub struct ConsoleTransport {
    next_handle: AtomicU64,
    private_channels: RwLock<HashMap<String, String>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            private_channels: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_as(
        &self,
        speaker: &str,
        _channel_id: &str,
        text: &str,
    ) -> Result<(), TransportError> {
        println!("[{speaker}] {text}");
        Ok(())
    }

    async fn send_system(&self, _channel_id: &str, text: &str) -> Result<(), TransportError> {
        println!("{text}");
        Ok(())
    }

    async fn begin_thinking(
        &self,
        _channel_id: &str,
        label: &str,
    ) -> Result<IndicatorHandle, TransportError> {
        println!("({label})");
        Ok(IndicatorHandle(
            self.next_handle.fetch_add(1, Ordering::Relaxed),
        ))
    }

    async fn end_thinking(&self, _channel_id: &str, _handle: IndicatorHandle) {
        // A printed line can't be unprinted; nothing to tear down
    }

    async fn create_private_channel(&self, user_id: &str) -> Result<String, TransportError> {
        let mut channels = self.private_channels.write().await;
        let channel = channels
            .entry(user_id.to_string())
            .or_insert_with(|| format!("{user_id}-private"));
        Ok(channel.clone())
    }
}
