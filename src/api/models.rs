use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::{
    models::{format_timestamp, Message, Usage},
    ChatError,
};

/// Body of a Submit-turn request. History timestamps arrive as ISO-8601 strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
}

/// `{success, data|error}` wrapper used by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn invalid_request(details: Vec<String>) -> Self {
        Self {
            message: "Invalid request data".to_string(),
            error_type: "validation",
            code: None,
            details: Some(details),
        }
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: "service",
            code: None,
            details: None,
        }
    }
}

impl From<&ChatError> for ErrorBody {
    fn from(err: &ChatError) -> Self {
        Self {
            message: err.to_string(),
            error_type: err.kind().as_str(),
            code: err.code(),
            details: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatData {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: HealthStatus,
    pub timestamp: String,
}

impl HealthData {
    pub fn new(status: HealthStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            timestamp: format_timestamp(&at),
        }
    }
}
