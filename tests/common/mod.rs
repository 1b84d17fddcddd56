//! Stub provider and app wiring shared by the HTTP integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use chat_relay::api::routes::configure;
use chat_relay::llm::{
    models::{ContentBlock, MessagesRequest, MessagesResponse, ProviderUsage},
    ChatService, LlmError, LlmProvider, ModelSettings,
};
use serde_json::Value;

pub enum Behavior {
    Reply(MessagesResponse),
    Fail(LlmError),
    Panic,
}

pub struct StubProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<MessagesRequest>>,
}

impl StubProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(blocks: &[&str], input_tokens: u32, output_tokens: u32) -> Arc<Self> {
        Self::new(Behavior::Reply(MessagesResponse {
            content: blocks
                .iter()
                .map(|t| ContentBlock::Text { text: t.to_string() })
                .collect(),
            usage: ProviderUsage {
                input_tokens,
                output_tokens,
            },
        }))
    }

    pub fn failing(err: LlmError) -> Arc<Self> {
        Self::new(Behavior::Fail(err))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<MessagesRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn create_message(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            Behavior::Reply(response) => Ok(response.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("stub provider exploded"),
        }
    }
}

pub fn test_settings() -> ModelSettings {
    ModelSettings {
        model: "claude-3-5-sonnet-20241022".to_string(),
        max_tokens: 4096,
        temperature: 0.7,
    }
}

/// Sends `req` through a fresh app whose service is backed by `provider`
/// (no retries) and returns the status with the decoded JSON body.
pub async fn call(provider: Arc<StubProvider>, req: test::TestRequest) -> (StatusCode, Value) {
    let service = ChatService::new(provider, test_settings());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .configure(configure),
    )
    .await;

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}
