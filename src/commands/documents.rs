use std::path::Path;

use crate::errors::AppError;
use crate::state::AppState;

pub async fn upload(state: &mut AppState, file: &Path) -> Result<(), AppError> {
    let config = state.config.clone();
    let doc = state
        .workspace
        .upload(&state.client, file, &config.upload, &config.chunking)
        .await?;

    let chunk_count = doc.chunks.as_ref().map(Vec::len).unwrap_or(0);
    println!("Uploaded {} ({})", doc.name, doc.id);
    if chunk_count > 0 {
        println!("{chunk_count} chunks extracted locally");
    }
    if let Some(conv) = state.workspace.active_conversation() {
        if let Some(greeting) = conv.messages.first() {
            println!("\nassistant: {}", greeting.content);
        }
    }
    Ok(())
}

pub fn list(state: &AppState) -> Result<(), AppError> {
    let docs = state.workspace.documents();
    if docs.is_empty() {
        println!("No documents uploaded yet");
        return Ok(());
    }

    let active = state.workspace.active_document_id();
    for doc in docs {
        let marker = if Some(doc.id.as_str()) == active { "*" } else { " " };
        let uploaded = chrono::DateTime::from_timestamp_millis(doc.uploaded_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{marker} {}  {}  {}  {uploaded}",
            doc.id,
            doc.name,
            format_size(doc.size)
        );
    }
    Ok(())
}

pub fn select(state: &mut AppState, id: &str) -> Result<(), AppError> {
    state.workspace.select_document(id)?;
    println!("Active document: {id}");
    Ok(())
}

pub fn delete(state: &mut AppState, id: &str) -> Result<(), AppError> {
    let doc = state.workspace.delete_document(id)?;
    println!("Deleted {}", doc.name);
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    match bytes {
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}
