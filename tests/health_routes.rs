mod common;

use actix_web::{http::StatusCode, test};
use chat_relay::llm::LlmError;
use chrono::{DateTime, Utc};
use common::{call, Behavior, StubProvider};

fn probe() -> test::TestRequest {
    test::TestRequest::get().uri("/api/chat")
}

#[actix_web::test]
async fn test_healthy_provider() {
    let provider = StubProvider::replying(&["Hello!"], 3, 2);

    let (status, body) = call(provider.clone(), probe()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    let timestamp = body["data"]["timestamp"].as_str().unwrap();
    assert!(timestamp.parse::<DateTime<Utc>>().is_ok());
    assert_eq!(provider.calls(), 1);

    let request = provider.last_request().unwrap();
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].content, "Hello");
}

#[actix_web::test]
async fn test_failing_provider_reports_unhealthy() {
    let provider = StubProvider::failing(LlmError::Api {
        status: 401,
        message: "authentication_error: invalid x-api-key".to_string(),
    });

    let (status, body) = call(provider, probe()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "unhealthy");
    assert!(body["data"]["timestamp"].is_string());
}

#[actix_web::test]
async fn test_unreachable_provider_reports_unhealthy() {
    let provider = StubProvider::failing(LlmError::Network("timed out".to_string()));

    let (status, body) = call(provider, probe()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["data"]["status"], "unhealthy");
}

#[actix_web::test]
async fn test_panicking_check_reports_service_error() {
    let provider = StubProvider::new(Behavior::Panic);

    let (status, body) = call(provider, probe()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "service");
    assert_eq!(body["error"]["message"], "Health check failed");
    assert!(body.get("data").is_none());
}
