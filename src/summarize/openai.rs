//! OpenAI chat-completion text generator.

use super::{GenerationRequest, TextGenerator};
use crate::error::{Result, VidsumError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Text generator backed by the OpenAI chat completions API.
pub struct OpenAiGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAiGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
        })
    }

    /// Use an already configured client.
    pub fn with_client(client: async_openai::Client<async_openai::config::OpenAIConfig>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    #[instrument(skip(self, request), fields(model = %request.model, max_tokens = request.max_tokens))]
    #[allow(deprecated)]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system_prompt.clone())
                .build()
                .map_err(|e| VidsumError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user_prompt.clone())
                .build()
                .map_err(|e| VidsumError::OpenAI(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(|e| VidsumError::OpenAI(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            VidsumError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| VidsumError::OpenAI("Empty response from LLM".to_string()))?;

        debug!("Generated {} characters", content.chars().count());
        Ok(content)
    }
}
