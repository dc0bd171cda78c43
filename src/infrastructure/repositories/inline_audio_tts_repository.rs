use super::tts_repository::TtsRepository;
use crate::domain::tts::AudioClip;
use crate::domain::work::parse::snippet;
use async_trait::async_trait;
use serde_json::{json, Value};

const DEFAULT_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";

/// Speech provider reached over plain HTTP that returns audio inline in a
/// Gemini-style `generateContent` envelope.
pub struct InlineAudioTtsRepository {
    url: String,
    api_key: Option<String>,
    voice: String,
    http_client: reqwest::Client,
}

impl InlineAudioTtsRepository {
    pub fn new(url: String, api_key: Option<String>, voice: String) -> Self {
        Self {
            url,
            api_key,
            voice,
            http_client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                }
            }
        })
    }
}

/// Find the first inline audio part in a provider response.
///
/// Providers disagree on casing, so both `inlineData`/`inline_data` and
/// `mimeType`/`mime_type` are accepted.
pub fn extract_inline_audio(body: &Value) -> Option<AudioClip> {
    let candidates = body.get("candidates")?.as_array()?;

    candidates
        .iter()
        .filter_map(|candidate| candidate.pointer("/content/parts")?.as_array())
        .flatten()
        .find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            let data = inline.get("data")?.as_str().filter(|d| !d.is_empty())?;
            let mime_type = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_MIME_TYPE);

            Some(AudioClip::from_base64(mime_type, data.to_string()))
        })
}

#[async_trait]
impl TtsRepository for InlineAudioTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, String> {
        let start_time = std::time::Instant::now();

        tracing::debug!(
            voice = %self.voice,
            text_length = text.len(),
            "Calling inline-audio TTS API"
        );

        let mut request = self.http_client.post(&self.url).json(&self.request_body(text));
        if let Some(api_key) = &self.api_key {
            request = request.header("x-goog-api-key", api_key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Inline-audio TTS request failed");
            format!("Inline-audio TTS transport error: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = status.as_u16(),
                body = %snippet(&body, 200),
                "Inline-audio TTS returned non-success status"
            );
            return Err(format!("Inline-audio TTS status {}", status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse inline-audio TTS response: {}", e))?;

        let clip = extract_inline_audio(&body).ok_or_else(|| {
            tracing::warn!(
                body = %snippet(&body.to_string(), 200),
                "Inline-audio TTS response carried no audio part"
            );
            "Inline-audio TTS response has no audio".to_string()
        })?;

        tracing::debug!(
            provider = "inline",
            mime_type = %clip.mime_type,
            latency_ms = start_time.elapsed().as_millis(),
            "Inline audio received"
        );

        Ok(clip)
    }

    fn provider(&self) -> &'static str {
        "inline"
    }
}
