pub mod anthropic;
pub mod models;
pub mod service;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;

use models::{MessagesRequest, MessagesResponse};

pub use anthropic::AnthropicProvider;
pub use service::{ChatService, ModelSettings, RetryPolicy};

/// Failure reported by a provider transport.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    #[error("{status} {message}")]
    Api { status: u16, message: String },
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Invalid provider response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Api,
    Network,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Api => "api",
            ErrorKind::Network => "network",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// Client-facing failure of a chat turn. Raw provider errors never escape the
/// adapter; they are always rewritten into one of these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),
    #[error("Claude API Error: {message}")]
    Api { message: String, status: Option<u16> },
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Unknown(String),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::Validation(_) => ErrorKind::Validation,
            ChatError::Api { .. } => ErrorKind::Api,
            ChatError::Network(_) => ErrorKind::Network,
            ChatError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Diagnostic code; the provider's HTTP status for `api` failures.
    pub fn code(&self) -> Option<String> {
        match self {
            ChatError::Api { status, .. } => status.map(|s| s.to_string()),
            _ => None,
        }
    }
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, message } => ChatError::Api {
                message: format!("{} {}", status, message),
                status: Some(status),
            },
            LlmError::Network(msg) => ChatError::Network(msg),
            LlmError::Decode(msg) => ChatError::Unknown(msg),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn create_message(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_carry_status_code() {
        let err: ChatError = LlmError::Api {
            status: 429,
            message: "rate_limit_error: slow down".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.code().as_deref(), Some("429"));
        assert_eq!(err.to_string(), "Claude API Error: 429 rate_limit_error: slow down");
    }

    #[test]
    fn test_transport_and_decode_classification() {
        let network: ChatError = LlmError::Network("connection refused".to_string()).into();
        assert_eq!(network.kind(), ErrorKind::Network);
        assert_eq!(network.code(), None);

        let decode: ChatError = LlmError::Decode("missing field `content`".to_string()).into();
        assert_eq!(decode.kind(), ErrorKind::Unknown);
    }
}
