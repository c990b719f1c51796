use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::dto::api::{
    ChatHistoryResponse, ErrorBody, QueryRequest, QueryResponse, StatusResponse, UploadResponse,
};
use crate::errors::AppError;
use crate::services::api_key::validate_api_key;

pub const API_KEY_HEADER: &str = "api-key";

const INVALID_KEY_MESSAGE: &str =
    "Invalid DeepSeek API key. Please check your API key and try again.";
const MISSING_KEY_MESSAGE: &str = "API key is required";

/// Per-call credentials. Passed into every request instead of being stored
/// on the shared client.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    api_key: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: &str) -> Result<Self, AppError> {
        Ok(Self {
            api_key: Some(validate_api_key(key)?),
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

/// HTTP client for the remote document-AI service.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        url::Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn initialize(&self, ctx: &RequestContext) -> Result<StatusResponse, AppError> {
        let key = ctx
            .api_key()
            .ok_or_else(|| AppError::Validation(MISSING_KEY_MESSAGE.to_string()))?;

        tracing::debug!("POST /initialize");
        let response = ctx
            .apply(self.client.post(self.url("initialize")))
            .query(&[("api_key", key)])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("initialize rejected the API key");
            return Err(AppError::Unauthorized(INVALID_KEY_MESSAGE.to_string()));
        }

        decode(response, "Failed to initialize AI assistant").await
    }

    pub async fn upload_document(
        &self,
        ctx: &RequestContext,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, AppError> {
        tracing::debug!("POST /documents/upload ({filename}, {} bytes)", bytes.len());

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = ctx
            .apply(self.client.post(self.url("documents/upload")))
            .multipart(form)
            .send()
            .await?;

        decode(response, "Failed to upload document").await
    }

    pub async fn query(
        &self,
        ctx: &RequestContext,
        question: &str,
    ) -> Result<QueryResponse, AppError> {
        tracing::debug!("POST /query");
        let response = ctx
            .apply(self.client.post(self.url("query")))
            .json(&QueryRequest {
                question: question.to_string(),
            })
            .send()
            .await?;

        decode(response, "Failed to query document").await
    }

    pub async fn chat_history(
        &self,
        ctx: &RequestContext,
    ) -> Result<ChatHistoryResponse, AppError> {
        tracing::debug!("GET /chat-history");
        let response = ctx
            .apply(self.client.get(self.url("chat-history")))
            .send()
            .await?;

        decode(response, "Failed to load chat history").await
    }

    pub async fn reset(&self, ctx: &RequestContext) -> Result<StatusResponse, AppError> {
        tracing::debug!("POST /reset");
        let response = ctx
            .apply(self.client.post(self.url("reset")))
            .send()
            .await?;

        decode(response, "Failed to reset knowledge base").await
    }
}

/// Decode a success body, or translate an error status into an [`AppError`].
async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, AppError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| AppError::Api {
            status: status.as_u16(),
            message: format!("Unexpected response from document service: {e}"),
        });
    }

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail_text());

    tracing::warn!(
        "Document service returned {status}: {}",
        detail.as_deref().unwrap_or(fallback)
    );

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized(
            detail.unwrap_or_else(|| MISSING_KEY_MESSAGE.to_string()),
        ));
    }

    Err(AppError::Api {
        status: status.as_u16(),
        message: detail.unwrap_or_else(|| fallback.to_string()),
    })
}
