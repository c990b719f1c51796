use crate::errors::AppError;

const KEY_PREFIX: &str = "sk-";

/// Trim and check a DeepSeek-style API key, returning the trimmed key.
pub fn validate_api_key(key: &str) -> Result<String, AppError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::Validation("API key is required".to_string()));
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(AppError::InvalidApiKeyFormat);
    }
    Ok(key.to_string())
}

/// Render a key for display, keeping the prefix and the last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible_tail = 4;
    if chars.len() <= KEY_PREFIX.len() + visible_tail {
        return "*".repeat(chars.len());
    }

    let tail: String = chars[chars.len() - visible_tail..].iter().collect();
    let hidden = chars.len() - KEY_PREFIX.len() - visible_tail;
    format!("{KEY_PREFIX}{}{tail}", "*".repeat(hidden))
}
