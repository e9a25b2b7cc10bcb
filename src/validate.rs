//! Input validation
//!
//! Checks that run before any network call: the API credential, the input
//! text, the avatar image and the voice selector.

use std::path::Path;
use crate::config::TtsVoice;
use crate::error::{AvatarError, Result};

/// Return the configured API key, or fail if it is absent or blank
pub fn require_api_key(api_key: Option<&str>) -> Result<&str> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => {
            log::error!("OpenAI API key is not configured");
            Err(AvatarError::MissingApiKey)
        }
    }
}

/// Read the input text file
pub async fn read_input_text(path: &Path) -> Result<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AvatarError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Loaded input text from {} ({} characters)", path.display(), text.chars().count());
    Ok(text)
}

/// Check that the avatar image is accessible
pub async fn require_avatar(path: &Path) -> Result<()> {
    if tokio::fs::metadata(path).await.is_err() {
        log::error!("Avatar image not found: {}", path.display());
        return Err(AvatarError::AvatarNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Parse a voice selector into one of the supported presets
pub fn parse_voice(name: &str) -> Result<TtsVoice> {
    name.parse()
}
