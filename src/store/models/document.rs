use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub uploaded_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<String>>,
}

impl Document {
    pub fn new(name: &str, size: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            size,
            uploaded_at: chrono::Utc::now().timestamp_millis(),
            content: None,
            chunks: None,
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub index: usize,
}

/// Number chunks by their position in the sequence.
pub fn index_chunks(chunks: impl IntoIterator<Item = String>) -> Vec<DocumentChunk> {
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, content)| DocumentChunk { content, index })
        .collect()
}
