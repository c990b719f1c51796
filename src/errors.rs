use crate::services::text_processing::ChunkError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid DeepSeek API key format. API keys should start with \"sk-\"")]
    InvalidApiKeyFormat,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("Could not reach the document service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Chunking(#[from] ChunkError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                2
            }
            _ => 1,
        }
    }
}
