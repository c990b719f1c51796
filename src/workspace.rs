//! Client-side state: documents, their conversations, the active document and
//! the API key.
//!
//! State is read from the [`KeyValueStore`] once in [`Workspace::load`] and
//! written back after every transition.

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::config::UploadConfig;
use crate::dto::api::QueryResponse;
use crate::errors::AppError;
use crate::services::api_client::{BackendClient, RequestContext};
use crate::services::api_key::validate_api_key;
use crate::services::text_extract::{self, PDF_MIME};
use crate::services::text_processing::{ChunkConfig, chunk_text, normalize_text};
use crate::store::models::conversation::{Conversation, Message, Role};
use crate::store::models::document::Document;
use crate::store::{
    ACTIVE_DOCUMENT_KEY, API_KEY_KEY, CONVERSATIONS_KEY, DOCUMENTS_KEY, KeyValueStore,
};

const NO_API_KEY: &str = "Please set your API key first";
const NO_ACTIVE_DOCUMENT: &str = "Select or upload a document to start a conversation";

pub struct Workspace<S: KeyValueStore> {
    store: S,
    documents: Vec<Document>,
    conversations: Vec<Conversation>,
    active_document_id: Option<String>,
    api_key: Option<String>,
}

impl<S: KeyValueStore> Workspace<S> {
    pub fn load(store: S) -> anyhow::Result<Self> {
        let documents: Vec<Document> = read_json(&store, DOCUMENTS_KEY)?.unwrap_or_default();
        let conversations: Vec<Conversation> =
            read_json(&store, CONVERSATIONS_KEY)?.unwrap_or_default();
        let api_key = store.get(API_KEY_KEY)?.filter(|k| !k.is_empty());

        // A stale active id (document deleted elsewhere) is dropped.
        let active_document_id = store
            .get(ACTIVE_DOCUMENT_KEY)?
            .filter(|id| documents.iter().any(|d| &d.id == id));

        tracing::debug!(
            "Loaded workspace: {} documents, {} conversations",
            documents.len(),
            conversations.len()
        );

        Ok(Self {
            store,
            documents,
            conversations,
            active_document_id,
            api_key,
        })
    }

    // ── API key ───────────────────────────────────────────────

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<(), AppError> {
        let key = validate_api_key(key)?;
        self.store.set(API_KEY_KEY, &key)?;
        self.api_key = Some(key);
        Ok(())
    }

    pub fn clear_api_key(&mut self) -> Result<(), AppError> {
        self.store.remove(API_KEY_KEY)?;
        self.api_key = None;
        Ok(())
    }

    /// Request context carrying the stored key.
    pub fn request_context(&self) -> Result<RequestContext, AppError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Validation(NO_API_KEY.to_string()))?;
        RequestContext::with_api_key(key)
    }

    // ── Documents ─────────────────────────────────────────────

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_document_id(&self) -> Option<&str> {
        self.active_document_id.as_deref()
    }

    pub fn active_document(&self) -> Option<&Document> {
        let id = self.active_document_id.as_deref()?;
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_document_id.as_deref()?;
        self.conversations.iter().find(|c| c.document_id == id)
    }

    /// Record a document, open its conversation and make it active.
    pub fn add_document(
        &mut self,
        name: &str,
        size: u64,
        content: Option<String>,
        chunk_config: &ChunkConfig,
    ) -> Result<Document, AppError> {
        let mut document = Document::new(name, size);
        if let Some(text) = content.filter(|t| !t.is_empty()) {
            document.chunks = Some(chunk_text(&text, chunk_config)?);
            document.content = Some(text);
        }

        let mut documents = self.documents.clone();
        documents.push(document.clone());
        let mut conversations = self.conversations.clone();
        conversations.push(Conversation::started_for(&document.id, name));
        let active = Some(document.id.clone());

        self.persist_all(&documents, &conversations, active.as_deref())?;
        self.documents = documents;
        self.conversations = conversations;
        self.active_document_id = active;

        tracing::info!("Added document '{}' ({})", document.name, document.id);
        Ok(document)
    }

    pub fn select_document(&mut self, id: &str) -> Result<(), AppError> {
        if !self.documents.iter().any(|d| d.id == id) {
            return Err(AppError::NotFound(format!("Document not found: {id}")));
        }
        self.persist_active(Some(id))?;
        self.active_document_id = Some(id.to_string());
        Ok(())
    }

    /// Remove a document together with its conversation.
    pub fn delete_document(&mut self, id: &str) -> Result<Document, AppError> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Document not found: {id}")))?;

        let mut documents = self.documents.clone();
        let removed = documents.remove(index);
        let conversations: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| c.document_id != id)
            .cloned()
            .collect();
        let active = self
            .active_document_id
            .clone()
            .filter(|active| active != id);

        self.persist_all(&documents, &conversations, active.as_deref())?;
        self.documents = documents;
        self.conversations = conversations;
        self.active_document_id = active;

        tracing::info!("Deleted document '{}' ({id})", removed.name);
        Ok(removed)
    }

    // ── Conversation ──────────────────────────────────────────

    /// Append a message to the active document's conversation.
    pub fn push_message(&mut self, role: Role, content: &str) -> Result<Message, AppError> {
        let document_id = self
            .active_document_id
            .clone()
            .ok_or_else(|| AppError::Validation(NO_ACTIVE_DOCUMENT.to_string()))?;

        let mut conversations = self.conversations.clone();
        let conversation = conversations
            .iter_mut()
            .find(|c| c.document_id == document_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("No conversation for document {document_id}"))
            })?;

        let message = Message::new(role, content);
        conversation.messages.push(message.clone());
        self.persist_conversations(&conversations)?;
        self.conversations = conversations;
        Ok(message)
    }

    /// Send a question about the active document and record both sides.
    ///
    /// The user's message stays recorded when the backend call fails.
    pub async fn ask(
        &mut self,
        client: &BackendClient,
        question: &str,
    ) -> Result<QueryResponse, AppError> {
        let ctx = self.request_context()?;
        if self.active_document_id.is_none() {
            return Err(AppError::Validation(NO_ACTIVE_DOCUMENT.to_string()));
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        self.push_message(Role::User, question)?;
        let response = client.query(&ctx, question).await?;
        self.push_message(Role::Assistant, &response.answer)?;

        tracing::info!("Answer received ({} tokens)", response.tokens_used);
        Ok(response)
    }

    /// Upload a PDF to the backend and record it locally on success.
    pub async fn upload(
        &mut self,
        client: &BackendClient,
        path: &Path,
        upload_config: &UploadConfig,
        chunk_config: &ChunkConfig,
    ) -> Result<Document, AppError> {
        let ctx = self.request_context()?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed.pdf".to_string());

        if text_extract::content_type_for(&name) != PDF_MIME {
            return Err(AppError::Validation("Only PDF files are supported".to_string()));
        }

        let unreadable = |e: std::io::Error| {
            AppError::Validation(format!("Failed to read {}: {e}", path.display()))
        };
        let too_large = || {
            AppError::Validation(format!(
                "File too large. Maximum size is {} MB",
                upload_config.max_file_size_mb
            ))
        };

        // Oversized files are refused before any bytes are loaded.
        let metadata = tokio::fs::metadata(path).await.map_err(unreadable)?;
        if metadata.len() > upload_config.max_file_size_bytes() {
            return Err(too_large());
        }

        let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
        let size = bytes.len() as u64;
        if size > upload_config.max_file_size_bytes() {
            return Err(too_large());
        }

        // Local text is only a preview; the upload proceeds without it.
        let content = match text_extract::extract_text(&bytes, PDF_MIME, &name).await {
            Ok(text) => Some(normalize_text(&text)),
            Err(e) => {
                tracing::warn!("Local text extraction failed for '{name}': {e:#}");
                None
            }
        };

        let response = client.upload_document(&ctx, &name, bytes).await?;
        if !response.success {
            return Err(AppError::Api {
                status: 200,
                message: response.message,
            });
        }
        tracing::info!("Backend accepted '{name}': {}", response.message);

        self.add_document(&name, size, content, chunk_config)
    }

    // ── Persistence ───────────────────────────────────────────

    // Transitions build the next state on the side and only commit it to
    // `self` once these writes succeed.

    fn persist_all(
        &self,
        documents: &[Document],
        conversations: &[Conversation],
        active_document_id: Option<&str>,
    ) -> Result<(), AppError> {
        write_json(&self.store, DOCUMENTS_KEY, documents)?;
        self.persist_conversations(conversations)?;
        self.persist_active(active_document_id)
    }

    fn persist_conversations(&self, conversations: &[Conversation]) -> Result<(), AppError> {
        write_json(&self.store, CONVERSATIONS_KEY, conversations)?;
        Ok(())
    }

    fn persist_active(&self, active_document_id: Option<&str>) -> Result<(), AppError> {
        match active_document_id {
            Some(id) => self.store.set(ACTIVE_DOCUMENT_KEY, id)?,
            None => self.store.remove(ACTIVE_DOCUMENT_KEY)?,
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> anyhow::Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Stored '{key}' is not valid JSON"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn write_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("Failed to serialize '{key}'"))?;
    store.set(key, &raw)
}
