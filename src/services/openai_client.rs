use std::time::Duration;

use anyhow::anyhow;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::configuration::OpenaiSettings;

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("rate limited by model provider: {0}")]
    RateLimited(String),
    #[error("model request failed: {0}")]
    Provider(#[from] anyhow::Error),
}

impl CompletionError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CompletionError::RateLimited(_))
    }
}

impl From<OpenAIError> for CompletionError {
    fn from(e: OpenAIError) -> Self {
        if is_rate_limit(&e) {
            CompletionError::RateLimited(e.to_string())
        } else {
            CompletionError::Provider(e.into())
        }
    }
}

fn is_rate_limit(e: &OpenAIError) -> bool {
    match e {
        OpenAIError::ApiError(api) => {
            api.code.as_deref() == Some("rate_limit_exceeded")
                || matches!(api.r#type.as_deref(), Some("requests") | Some("tokens"))
        }
        _ => false,
    }
}

/// One chat completion per call. Retrying is the caller's job.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, instruction: &str, text: &str) -> Result<String, CompletionError>;
}

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenaiClient {
    pub fn new(settings: &OpenaiSettings) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(api_key) = &settings.api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(api_base) = &settings.api_base {
            config = config.with_api_base(api_base);
        }

        // The client retries 429s on its own for up to 15 minutes unless told not to.
        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        OpenaiClient {
            client: Client::with_config(config).with_backoff(no_retry),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenaiClient {
    async fn complete(&self, instruction: &str, text: &str) -> Result<String, CompletionError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.0_f32)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instruction)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(text)
                    .build()?
                    .into(),
            ])
            .max_tokens(1000_u32)
            .build()?;

        let response = self.client.chat().create(request).await?;
        log::debug!("Response: {:?}", response);

        let first_choice = response
            .choices
            .first()
            .ok_or_else(|| anyhow!("No choices in Openai response"))?
            .message
            .content
            .clone()
            .ok_or_else(|| anyhow!("No content"))?;

        Ok(first_choice)
    }
}
