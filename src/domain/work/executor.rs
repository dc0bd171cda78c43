use super::classify::parse_classification;
use super::error::CollaboratorError;
use super::parse::{extract_json, snippet};
use super::practice::{parse_practice_sentences, PracticeResult};
use super::prompt::{classify_messages, practice_messages};
use super::{WorkExecutor, WorkRequest, WorkType};
use crate::domain::tts::TtsService;
use crate::infrastructure::repositories::TextGenerationRepository;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Runs diary work against the text generator, and for practice work, the
/// speech service.
pub struct DiaryWorkExecutor {
    generator: Arc<dyn TextGenerationRepository>,
    speech: Option<Arc<TtsService>>,
}

impl DiaryWorkExecutor {
    pub fn new(
        generator: Arc<dyn TextGenerationRepository>,
        speech: Option<Arc<TtsService>>,
    ) -> Self {
        Self { generator, speech }
    }

    async fn generate_json(
        &self,
        work_type: WorkType,
        messages: &[super::ChatMessage],
    ) -> Result<Value, CollaboratorError> {
        let reply = self.generator.complete(messages).await?;

        extract_json(&reply).inspect_err(|e| {
            tracing::warn!(
                work_type = %work_type,
                error = %e,
                reply_preview = %snippet(&reply, 200),
                "Model reply is not valid JSON"
            );
        })
    }

    async fn classify(&self, request: &WorkRequest) -> Result<Value, CollaboratorError> {
        let value = self
            .generate_json(WorkType::Classify, &classify_messages(&request.text))
            .await?;
        let classification = parse_classification(value)?;

        serde_json::to_value(classification)
            .map_err(|e| CollaboratorError::Format(format!("could not encode result: {}", e)))
    }

    async fn practice(&self, request: &WorkRequest) -> Result<Value, CollaboratorError> {
        let value = self
            .generate_json(
                WorkType::Practice,
                &practice_messages(&request.text, request.context.as_ref()),
            )
            .await?;
        let sentences = parse_practice_sentences(value)?;

        let audio = match (&self.speech, request.with_audio) {
            (Some(speech), true) => speech.synthesize_all(&sentences).await,
            _ => vec![None; sentences.len()],
        };

        serde_json::to_value(PracticeResult::new(sentences, audio))
            .map_err(|e| CollaboratorError::Format(format!("could not encode result: {}", e)))
    }
}

#[async_trait]
impl WorkExecutor for DiaryWorkExecutor {
    async fn execute(&self, request: &WorkRequest) -> Result<Value, CollaboratorError> {
        let start_time = Instant::now();

        let result = match request.work_type {
            WorkType::Classify => self.classify(request).await,
            WorkType::Practice => self.practice(request).await,
        };

        match &result {
            Ok(_) => tracing::debug!(
                work_type = %request.work_type,
                latency_ms = start_time.elapsed().as_millis(),
                "Work executed"
            ),
            Err(e) => tracing::warn!(
                work_type = %request.work_type,
                error_kind = e.kind(),
                error = %e,
                latency_ms = start_time.elapsed().as_millis(),
                "Work execution failed"
            ),
        }

        result
    }
}
