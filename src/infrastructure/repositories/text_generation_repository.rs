use crate::domain::work::{ChatMessage, CollaboratorError};
use async_trait::async_trait;

/// Repository for chat-style text generation.
/// Abstracts the LLM provider behind a role-tagged message list in, raw reply text out.
#[async_trait]
pub trait TextGenerationRepository: Send + Sync {
    /// Send `messages` and return the model's reply text unchanged
    ///
    /// # Errors
    /// `Configuration` when credentials are missing, `Transport`/`Status` for
    /// network and provider failures, `Format` when the reply has no text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CollaboratorError>;

    /// Whether the repository has the credentials it needs
    fn is_configured(&self) -> bool {
        true
    }
}
