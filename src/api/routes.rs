use actix_web::{
    error::{InternalError, JsonPayloadError},
    get,
    http::StatusCode,
    post, web, HttpRequest, HttpResponse, Result as WebResult,
};
use tracing::{error, warn};

use crate::api::models::{ChatData, ChatRequest, Envelope, ErrorBody, HealthData, HealthStatus};
use crate::llm::{
    models::now_millis, validation::MAX_MESSAGE_CHARS, ChatError, ChatService, ErrorKind,
};

/// Large enough for a full-length message plus a long history.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn status_for(err: &ChatError) -> StatusCode {
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Api | ErrorKind::Network | ErrorKind::Unknown => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn invalid_request(details: Vec<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(Envelope::<ChatData>::err(ErrorBody::invalid_request(details)))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    error!("Chat API Error: malformed request body: {}", err);
    let response = invalid_request(vec![err.to_string()]);
    InternalError::from_response(err, response).into()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .content_type_required(false)
        .error_handler(json_error_handler)
}

/// Shape checks serde cannot express.
fn check_request(req: &ChatRequest) -> Vec<String> {
    let mut issues = Vec::new();
    let len = req.message.chars().count();
    if len == 0 {
        issues.push("message: Message cannot be empty".to_string());
    } else if len > MAX_MESSAGE_CHARS {
        issues.push("message: Message too long".to_string());
    }
    issues
}

#[post("")]
pub async fn submit_turn(
    service: web::Data<ChatService>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    let issues = check_request(&req);
    if !issues.is_empty() {
        warn!("Chat API Error: invalid request data: {}", issues.join("; "));
        return Ok(invalid_request(issues));
    }

    match service.send_message(&req.message, &req.conversation_history).await {
        Ok(response) => Ok(HttpResponse::Ok().json(Envelope::ok(ChatData {
            message: response.message,
            usage: response.usage,
        }))),
        Err(e) => {
            error!("Chat API Error ({}): {}", e.kind().as_str(), e);
            Ok(HttpResponse::build(status_for(&e))
                .json(Envelope::<ChatData>::err(ErrorBody::from(&e))))
        }
    }
}

#[get("")]
pub async fn health_check(service: web::Data<ChatService>) -> WebResult<HttpResponse> {
    let probe = service.clone();
    // A panic inside the check surfaces as a join error instead of tearing down the worker.
    let outcome = actix_web::rt::spawn(async move { probe.test_connection().await }).await;

    match outcome {
        Ok(true) => Ok(HttpResponse::Ok().json(Envelope::ok(HealthData::new(
            HealthStatus::Healthy,
            now_millis(),
        )))),
        Ok(false) => Ok(HttpResponse::ServiceUnavailable().json(Envelope::ok(HealthData::new(
            HealthStatus::Unhealthy,
            now_millis(),
        )))),
        Err(e) => {
            error!("Health check failed: {}", e);
            Ok(HttpResponse::ServiceUnavailable()
                .json(Envelope::<HealthData>::err(ErrorBody::service("Health check failed"))))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/chat")
            .app_data(json_config())
            .service(submit_turn)
            .service(health_check),
    );
}
