use serde::Deserialize;

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_OVERLAP: usize = 50;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Invalid chunk configuration: chunk_size={chunk_size}, overlap={overlap} (need chunk_size > 0 and overlap < chunk_size)")]
    InvalidConfiguration { chunk_size: usize, overlap: usize },
}

/// Window parameters for [`chunk_text`], both counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        let config = Self { chunk_size, overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 || self.overlap >= self.chunk_size {
            return Err(ChunkError::InvalidConfiguration {
                chunk_size: self.chunk_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Distance the scan cursor moves between chunks.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Whitespace is the Unicode `White_Space` class (`char::is_whitespace`):
/// U+0085 (NEL) collapses like any other space, while U+FEFF (BOM) is not
/// whitespace and is kept as text.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into overlapping character windows, snapping each window's end
/// back to the last `.` or `\n` when one lies inside it.
///
/// The cursor always advances by a fixed stride of `chunk_size - overlap`,
/// independent of where a snapped chunk actually ended. A snapped chunk may
/// be one character longer than `chunk_size` when the delimiter sits exactly
/// on the window's end offset.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<String>, ChunkError> {
    config.validate()?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let len = chars.len();
    let stride = config.stride();

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        // Saturates for huge `chunk_size`; the clamp below then takes over.
        let candidate = start.saturating_add(config.chunk_size);

        let end = if candidate >= len {
            len
        } else {
            // Only delimiters strictly after `start` can move the boundary.
            match chars[start + 1..=candidate]
                .iter()
                .rposition(|&c| c == '.' || c == '\n')
            {
                Some(offset) => start + 1 + offset + 1,
                None => candidate,
            }
        };

        let slice: String = chars[start..end].iter().collect();
        let chunk = slice.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        start = start.saturating_add(stride);
    }

    tracing::debug!(
        "chunk_text: {} chars -> {} chunks (size {}, overlap {})",
        len,
        chunks.len(),
        config.chunk_size,
        config.overlap
    );

    Ok(chunks)
}
