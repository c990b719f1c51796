//! In-process stand-in for the remote document API.

#![allow(dead_code)]

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use docchat::config::{ApiConfig, UploadConfig};
use docchat::services::api_client::BackendClient;

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
pub struct Recorded {
    pub api_keys: Vec<Option<String>>,
    pub uploads: Vec<RecordedUpload>,
    pub questions: Vec<String>,
    pub resets: usize,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    pub recorded: Arc<Mutex<Recorded>>,
}

impl MockBackend {
    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: MockBackend,
}

impl TestServer {
    pub fn client(&self) -> BackendClient {
        BackendClient::new(&ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
            user_agent: "docchat-test".to_string(),
        })
        .unwrap()
    }
}

pub fn upload_config() -> UploadConfig {
    UploadConfig { max_file_size_mb: 50 }
}

pub async fn spawn_backend() -> TestServer {
    let backend = MockBackend::default();

    let app = Router::new()
        .route("/api/initialize", post(initialize))
        .route("/api/documents/upload", post(upload))
        .route("/api/query", post(query))
        .route("/api/chat-history", get(chat_history))
        .route("/api/reset", post(reset))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}/api"),
        backend,
    }
}

fn header_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn initialize(
    State(backend): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let key = params.get("api_key").cloned();
    backend.recorded().api_keys.push(key.clone());

    match key.as_deref() {
        Some(k) if k.starts_with("sk-revoked") => detail(StatusCode::UNAUTHORIZED, "revoked"),
        Some(k) if k.starts_with("sk-broken") => detail(StatusCode::BAD_REQUEST, "Upstream refused the key"),
        Some(_) => Json(json!({
            "status": "success",
            "message": "Assistant initialized successfully"
        }))
        .into_response(),
        None => detail(StatusCode::UNPROCESSABLE_ENTITY, "api_key missing"),
    }
}

async fn upload(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let key = header_key(&headers);
    backend.recorded().api_keys.push(key.clone());
    if key.is_none() {
        return detail(StatusCode::UNAUTHORIZED, "API key is required");
    }

    let Ok(Some(field)) = multipart.next_field().await else {
        return detail(StatusCode::BAD_REQUEST, "No file provided");
    };
    let name = field.name().unwrap_or_default().to_string();
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let Ok(bytes) = field.bytes().await else {
        return detail(StatusCode::BAD_REQUEST, "Failed to read file");
    };
    if name != "file" {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "field 'file' required");
    }

    backend.recorded().uploads.push(RecordedUpload {
        filename: filename.clone(),
        content_type,
        size: bytes.len(),
    });

    if filename.contains("unreadable") {
        return Json(json!({ "success": false, "message": "Could not read document content" }))
            .into_response();
    }

    Json(json!({ "success": true, "message": "Document processed successfully!" })).into_response()
}

async fn query(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let key = header_key(&headers);
    backend.recorded().api_keys.push(key.clone());
    if key.is_none() {
        return detail(StatusCode::UNAUTHORIZED, "API key is required");
    }

    let question = body["question"].as_str().unwrap_or_default().to_string();
    backend.recorded().questions.push(question.clone());

    match question.as_str() {
        "uninitialized" => detail(StatusCode::BAD_REQUEST, "Assistant not initialized"),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        q => Json(json!({ "answer": format!("Answer to: {q}"), "tokens_used": 7 })).into_response(),
    }
}

async fn chat_history(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let key = header_key(&headers);
    backend.recorded().api_keys.push(key.clone());
    if key.is_none() {
        return detail(StatusCode::UNAUTHORIZED, "API key is required");
    }

    let questions = backend.recorded().questions.clone();
    let history: Vec<Value> = questions
        .iter()
        .flat_map(|q| {
            [
                json!({ "role": "user", "content": q }),
                json!({ "role": "assistant", "content": format!("Answer to: {q}") }),
            ]
        })
        .collect();

    Json(json!({ "history": history })).into_response()
}

async fn reset(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let key = header_key(&headers);
    backend.recorded().api_keys.push(key.clone());
    if key.is_none() {
        return detail(StatusCode::UNAUTHORIZED, "API key is required");
    }

    backend.recorded().resets += 1;
    Json(json!({ "status": "success", "message": "Knowledge base reset successfully" }))
        .into_response()
}
