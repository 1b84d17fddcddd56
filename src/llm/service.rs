use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{AppConfig, ApiConfig, ModelConfig};
use crate::llm::{
    models::{
        ChatResponse, ContentBlock, Message, MessageParam, MessagesRequest, MessagesResponse, Role,
        Usage,
    },
    validation::validate_message,
    AnthropicProvider, ChatError, LlmError, LlmProvider,
};

const PROBE_MESSAGE: &str = "Hello";

/// Fixed sampling parameters sent with every turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&ModelConfig> for ModelSettings {
    fn from(cfg: &ModelConfig) -> Self {
        Self {
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

/// Bounded retry around the provider call. Only transport failures, rate limits
/// and provider-side faults are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn from_config(cfg: &ApiConfig) -> Self {
        Self {
            max_attempts: cfg.max_retries.max(1),
            base_delay: Duration::from_millis(500),
        }
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    fn should_retry(err: &LlmError) -> bool {
        match err {
            LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Decode(_) => false,
        }
    }
}

/// Translates conversations into provider requests and provider replies (or
/// failures) back into chat types.
pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    settings: ModelSettings,
    retry: RetryPolicy,
}

impl ChatService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ModelSettings) -> Self {
        Self {
            provider,
            settings,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let provider = AnthropicProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider), ModelSettings::from(&config.model))
            .with_retry(RetryPolicy::from_config(&config.api)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub async fn send_message(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<ChatResponse, ChatError> {
        self.send_with(message, history, self.retry).await
    }

    /// Liveness check: one canned round trip, never retried. Never fails.
    pub async fn test_connection(&self) -> bool {
        match self.send_with(PROBE_MESSAGE, &[], RetryPolicy::none()).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connection test failed: {}", e);
                false
            }
        }
    }

    async fn send_with(
        &self,
        message: &str,
        history: &[Message],
        retry: RetryPolicy,
    ) -> Result<ChatResponse, ChatError> {
        validate_message(message)?;

        let request = MessagesRequest {
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: build_messages(history, message),
        };

        let response = self.call_with_retry(&request, retry).await?;
        Ok(format_response(response))
    }

    async fn call_with_retry(
        &self,
        request: &MessagesRequest,
        retry: RetryPolicy,
    ) -> Result<MessagesResponse, LlmError> {
        let mut attempt = 1;
        loop {
            match self.provider.create_message(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < retry.max_attempts && RetryPolicy::should_retry(&e) => {
                    let delay = retry.delay_after(attempt);
                    warn!(
                        "{} call failed (attempt {}/{}): {}; retrying in {:?}",
                        self.provider.name(),
                        attempt,
                        retry.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// History entries in order (timestamps dropped), then the new user message.
pub fn build_messages(history: &[Message], message: &str) -> Vec<MessageParam> {
    history
        .iter()
        .map(|m| MessageParam {
            role: m.role,
            content: m.content.clone(),
        })
        .chain(std::iter::once(MessageParam {
            role: Role::User,
            content: message.to_string(),
        }))
        .collect()
}

fn format_response(response: MessagesResponse) -> ChatResponse {
    let content: String = response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect();

    ChatResponse {
        message: Message::assistant(content),
        usage: Some(Usage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        }),
    }
}
