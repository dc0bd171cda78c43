use super::tts_repository::TtsRepository;
use crate::domain::tts::AudioClip;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_INPUT_CHARS: usize = 4096;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, voice: String) -> Self {
        Self {
            client,
            model,
            voice,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn speech_voice(&self) -> Voice {
        match self.voice.to_lowercase().as_str() {
            "alloy" => Voice::Alloy,
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Nova,
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, String> {
        let start_time = std::time::Instant::now();
        let input: String = text.chars().take(MAX_INPUT_CHARS).collect();

        tracing::debug!(
            model = %self.model,
            voice = %self.voice,
            text_length = input.len(),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input,
            voice: self.speech_voice(),
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    voice = %self.voice,
                    text_length = text.len(),
                    "OpenAI TTS API call failed"
                );
                format!("OpenAI TTS error: {}", e)
            })?;

        if response.bytes.is_empty() {
            return Err("OpenAI TTS returned an empty audio body".to_string());
        }

        tracing::debug!(
            provider = "openai",
            audio_size_bytes = response.bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "OpenAI TTS audio received"
        );

        Ok(AudioClip::from_bytes("audio/mpeg", &response.bytes))
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}
