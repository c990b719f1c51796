//! Local text extraction for the chunk preview.
//!
//! The remote service does its own parsing; this only has to recover enough
//! text from a PDF (or a plain text/markdown file) to chunk it client-side.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

pub const PDF_MIME: &str = "application/pdf";
const TEXT_MIME: &str = "text/plain";
const MARKDOWN_MIME: &str = "text/markdown";
const UNKNOWN_MIME: &str = "application/octet-stream";

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Whether a file can be previewed, by its declared type or, when that is
/// unknown, by its name.
pub fn is_supported(content_type: &str, filename: &str) -> bool {
    let declared = match content_type {
        UNKNOWN_MIME => content_type_for(filename),
        other => other,
    };
    matches!(declared, PDF_MIME | TEXT_MIME | MARKDOWN_MIME)
}

/// MIME type implied by a file name's extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("pdf") => PDF_MIME,
        Some("txt") => TEXT_MIME,
        Some("md") => MARKDOWN_MIME,
        _ => UNKNOWN_MIME,
    }
}

/// Extract text from file bytes, routing to the correct extractor.
///
/// PDF extraction is CPU-bound and runs on the blocking pool with a timeout.
pub async fn extract_text(bytes: &[u8], content_type: &str, filename: &str) -> Result<String> {
    let kind = match content_type {
        UNKNOWN_MIME => content_type_for(filename),
        other => other,
    };

    match kind {
        PDF_MIME => extract_pdf_off_thread(bytes.to_vec(), filename).await,
        TEXT_MIME | MARKDOWN_MIME => decode_utf8(bytes),
        _ => anyhow::bail!("Cannot preview '{filename}': unsupported type {content_type}"),
    }
}

async fn extract_pdf_off_thread(bytes: Vec<u8>, filename: &str) -> Result<String> {
    tracing::debug!("Reading text from '{filename}' ({} bytes)", bytes.len());

    let task = tokio::task::spawn_blocking(move || read_pdf(&bytes));
    let text = tokio::time::timeout(EXTRACTION_TIMEOUT, task)
        .await
        .with_context(|| {
            format!(
                "Gave up reading '{filename}' after {}s",
                EXTRACTION_TIMEOUT.as_secs()
            )
        })?
        .context("PDF reader task aborted")??;

    tracing::debug!("'{filename}' gave {} chars of text", text.chars().count());
    Ok(text)
}

/// Poppler's `pdftotext` when it is installed and finds text, else the
/// pure-Rust reader.
fn read_pdf(bytes: &[u8]) -> Result<String> {
    match run_pdftotext(bytes) {
        Ok(text) if !text.trim().is_empty() => return Ok(text),
        Ok(_) => tracing::debug!("pdftotext found no text; trying pdf-extract"),
        Err(e) => tracing::debug!("pdftotext unavailable ({e:#}); trying pdf-extract"),
    }

    pdf_extract::extract_text_from_mem(bytes).context("Could not read text from the PDF")
}

fn run_pdftotext(bytes: &[u8]) -> Result<String> {
    use std::io::Write;

    let mut input = tempfile::Builder::new()
        .prefix("docchat-")
        .suffix(".pdf")
        .tempfile()
        .context("Could not stage the PDF for pdftotext")?;
    input.write_all(bytes)?;
    input.flush()?;

    let output = std::process::Command::new("pdftotext")
        .args(["-enc", "UTF-8"])
        .arg(input.path())
        .arg("-")
        .output()
        .context("Could not start pdftotext")?;

    anyhow::ensure!(
        output.status.success(),
        "pdftotext failed ({}): {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    );
    decode_utf8(&output.stdout)
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .context("Text is not valid UTF-8")
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported("application/pdf", "test.pdf"));
        assert!(is_supported("text/plain", "readme.txt"));
        assert!(is_supported("application/octet-stream", "notes.MD"));
        assert!(!is_supported("application/octet-stream", "image.png"));
        assert!(!is_supported("application/octet-stream", "no_extension"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("Paper.PDF"), PDF_MIME);
        assert_eq!(content_type_for("notes.md"), "text/markdown");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for(".pdf"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_extract_plaintext() {
        let bytes = b"Hello world\nThis is a test";
        let result = extract_text(bytes, "text/plain", "test.txt").await.unwrap();
        assert_eq!(result, "Hello world\nThis is a test");
    }

    #[tokio::test]
    async fn test_extract_by_extension() {
        let result = extract_text(b"# Title", "application/octet-stream", "a.md")
            .await
            .unwrap();
        assert_eq!(result, "# Title");
    }

    #[tokio::test]
    async fn test_extract_unsupported() {
        assert!(extract_text(b"\x89PNG", "image/png", "a.png").await.is_err());
        assert!(extract_text(b"data", "application/octet-stream", "a.bin").await.is_err());
    }

    #[tokio::test]
    async fn test_extract_rejects_invalid_utf8() {
        assert!(extract_text(b"\xff\xfe", "text/plain", "a.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_extract_invalid_pdf_fails() {
        assert!(extract_text(b"not a pdf", PDF_MIME, "broken.pdf").await.is_err());
    }
}
