//! Crisis detection port

use async_trait::async_trait;

/// Flags text indicating acute self-harm risk.
///
/// A flagged message short-circuits the whole turn: no personas run, only
/// the fixed safety notice is delivered.
#[async_trait]
pub trait CrisisDetector: Send + Sync {
    async fn detect(&self, user_text: &str) -> bool;
}
