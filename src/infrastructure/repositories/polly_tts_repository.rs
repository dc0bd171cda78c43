use super::tts_repository::TtsRepository;
use crate::domain::tts::AudioClip;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request
const MAX_INPUT_CHARS: usize = 3000;

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    voice: String,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, voice: String) -> Self {
        Self {
            polly_client,
            voice,
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, String> {
        let start_time = std::time::Instant::now();
        let input: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let voice_id = VoiceId::from(self.voice.as_str());
        let engine = Engine::Neural;

        tracing::debug!(
            voice = %self.voice,
            engine = ?engine,
            output_format = "Mp3",
            text_length = input.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(input)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = %self.voice,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {}", e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes();
        if audio_bytes.is_empty() {
            return Err("AWS Polly returned an empty audio stream".to_string());
        }

        tracing::debug!(
            provider = "polly",
            audio_size_bytes = audio_bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio stream collected successfully"
        );

        Ok(AudioClip::from_bytes("audio/mpeg", &audio_bytes))
    }

    fn provider(&self) -> &'static str {
        "polly"
    }
}
