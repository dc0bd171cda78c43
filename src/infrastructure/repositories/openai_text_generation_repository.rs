use super::text_generation_repository::TextGenerationRepository;
use crate::domain::work::parse::snippet;
use crate::domain::work::{ChatMessage, ChatRole, CollaboratorError};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI chat-completions implementation of the text generation repository.
/// Works with any OpenAI-compatible endpoint through `OPENAI_BASE_URL`.
pub struct OpenAiTextGenerationRepository {
    client: Option<Arc<Client<OpenAIConfig>>>,
    model: String,
    temperature: f32,
}

impl OpenAiTextGenerationRepository {
    pub fn new(client: Option<Arc<Client<OpenAIConfig>>>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }

    /// Build a client from credentials. Without an API key the repository
    /// still constructs, and every call fails with a configuration error.
    pub fn from_credentials(
        api_key: Option<&str>,
        base_url: Option<&str>,
        model: String,
        temperature: f32,
    ) -> Self {
        let client = api_key.filter(|key| !key.is_empty()).map(|key| {
            let mut config = OpenAIConfig::new().with_api_key(key);
            if let Some(base_url) = base_url.filter(|url| !url.is_empty()) {
                config = config.with_api_base(base_url);
            }
            Arc::new(Client::with_config(config))
        });

        Self::new(client, model, temperature)
    }

    fn to_request_messages(
        messages: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
        messages
            .iter()
            .map(|message| -> Result<ChatCompletionRequestMessage, OpenAIError> {
                Ok(match message.role {
                    ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                        .content(message.content.clone())
                        .build()?
                        .into(),
                    ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                        .content(message.content.clone())
                        .build()?
                        .into(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl TextGenerationRepository for OpenAiTextGenerationRepository {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CollaboratorError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| CollaboratorError::Configuration("OPENAI_API_KEY".to_string()))?;

        let start_time = std::time::Instant::now();
        let prompt_length: usize = messages.iter().map(|m| m.content.len()).sum();

        tracing::info!(
            model = %self.model,
            message_count = messages.len(),
            prompt_length,
            "Calling OpenAI chat completions API"
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .temperature(self.temperature)
            .messages(Self::to_request_messages(messages).map_err(|e| {
                CollaboratorError::Format(format!("could not build request: {}", e))
            })?)
            .build()
            .map_err(|e| CollaboratorError::Format(format!("could not build request: {}", e)))?;

        let response = client.chat().create(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                latency_ms = start_time.elapsed().as_millis(),
                "OpenAI chat completion failed"
            );
            map_openai_error(e)
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CollaboratorError::Format("OpenAI reply has no content".to_string()))?;

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis(),
            reply_length = content.len(),
            reply_preview = %snippet(&content, 120),
            "Chat completion received"
        );

        Ok(content)
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

/// API rejections keep the provider's error code; everything else is transport or format.
fn map_openai_error(err: OpenAIError) -> CollaboratorError {
    match err {
        OpenAIError::ApiError(api) => CollaboratorError::Rejected {
            code: api
                .code
                .or(api.r#type)
                .unwrap_or_else(|| "unknown".to_string()),
            message: api.message,
        },
        OpenAIError::JSONDeserialize(err) => {
            CollaboratorError::Format(format!("OpenAI response body: {}", err))
        }
        other => CollaboratorError::Transport(format!("OpenAI error: {}", other)),
    }
}
