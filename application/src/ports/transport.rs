//! Chat transport port
//!
//! Message delivery, the transient "thinking" indicator, and private
//! channel creation. Platform permission semantics stay behind the adapter.

use async_trait::async_trait;
use thiserror::Error;

/// Opaque handle to an ephemeral indicator message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorHandle(pub u64);

/// Errors that can occur during delivery
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Channel setup failed: {0}")]
    ChannelSetup(String),
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver text under a speaker's identity
    async fn send_as(
        &self,
        speaker: &str,
        channel_id: &str,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Deliver unattributed system text (safety notice, command replies)
    async fn send_system(&self, channel_id: &str, text: &str) -> Result<(), TransportError>;

    /// Show a transient "thinking" indicator
    async fn begin_thinking(
        &self,
        channel_id: &str,
        label: &str,
    ) -> Result<IndicatorHandle, TransportError>;

    /// Remove a thinking indicator.
    ///
    /// Infallible by contract: removal failures are swallowed by the
    /// adapter, a lingering indicator is never critical.
    async fn end_thinking(&self, channel_id: &str, handle: IndicatorHandle);

    /// Create (or find) a private channel for a user, returning its id
    async fn create_private_channel(&self, user_id: &str) -> Result<String, TransportError>;
}
