use crate::domain::tts::AudioClip;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, AWS Polly, inline-audio HTTP APIs)
///
/// Implementations synthesize a single short sentence per call; callers fan
/// out across sentences themselves.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one sentence to speech
    ///
    /// # Errors
    /// Returns error if synthesis fails, the provider is unavailable, or the
    /// provider response carries no audio
    async fn synthesize(&self, text: &str) -> Result<AudioClip, String>;

    /// Short provider name for logs and readiness output
    fn provider(&self) -> &'static str;
}
