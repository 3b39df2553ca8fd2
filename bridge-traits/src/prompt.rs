//! Confirmation prompt bridge.

use async_trait::async_trait;

/// Asynchronous yes/no prompt shown before any download starts.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Resolve `true` when the user accepts `message`.
    async fn confirm(&self, message: &str) -> bool;
}
