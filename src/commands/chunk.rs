use clap::Args;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::services::text_extract;
use crate::services::text_processing::{ChunkConfig, chunk_text, normalize_text};
use crate::state::AppState;
use crate::store::models::document::index_chunks;

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// PDF, text or markdown file
    pub file: PathBuf,

    /// Target maximum chunk length in characters [default: from config]
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks [default: from config]
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Collapse whitespace before chunking
    #[arg(long)]
    pub normalize: bool,

    /// Print chunks as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ChunkArgs, state: &AppState) -> Result<(), AppError> {
    let defaults = state.config.chunking;
    let config = ChunkConfig::new(
        args.chunk_size.unwrap_or(defaults.chunk_size),
        args.overlap.unwrap_or(defaults.overlap),
    )?;

    let name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = text_extract::content_type_for(&name);
    if !text_extract::is_supported(content_type, &name) {
        return Err(AppError::Validation(format!("Unsupported file type: {name}")));
    }

    let bytes = tokio::fs::read(&args.file).await.map_err(|e| {
        AppError::Validation(format!("Failed to read {}: {e}", args.file.display()))
    })?;
    let mut text = text_extract::extract_text(&bytes, content_type, &name).await?;
    if args.normalize {
        text = normalize_text(&text);
    }

    let chunks = index_chunks(chunk_text(&text, &config)?);

    if args.json {
        let json = serde_json::to_string_pretty(&chunks)
            .map_err(|e| AppError::Internal(e.into()))?;
        println!("{json}");
    } else {
        for chunk in &chunks {
            println!("--- chunk {} ({} chars)", chunk.index, chunk.content.chars().count());
            println!("{}", chunk.content);
        }
    }
    Ok(())
}
