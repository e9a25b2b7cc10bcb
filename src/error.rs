//! Error types for the avatar generation pipeline
//!
//! Every stage returns [`Result`]; nothing is retried, so an error always
//! ends the run and is reported by the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the avatar generation pipeline
#[derive(Debug, Error)]
pub enum AvatarError {
    /// The API credential is not configured
    #[error("OPENAI_API_KEY not found in environment variables")]
    MissingApiKey,

    /// Invalid configuration value (voice, model variant, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input text file could not be read
    #[error("Failed to read input text {}: {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input value rejected before any work was started
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Avatar image is not accessible
    #[error("Avatar image not found: {}", .0.display())]
    AvatarNotFound(PathBuf),

    /// Speech service call failed
    #[error("TTS generation failed: {0}")]
    SpeechSynthesis(String),

    /// The video process could not be launched at all
    #[error("Failed to start video generation process {}: {source}", .program.display())]
    ProcessStart {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The video process exited with a non-zero code
    #[error("Video generation failed with code {code}\nStderr: {stderr}")]
    VideoSynthesis { code: i32, stderr: String },

    /// The video process was killed before it could report an exit code
    #[error("Video generation process was terminated by a signal\nStderr: {stderr}")]
    VideoTerminated { stderr: String },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AvatarError {
    /// Follow-up instructions printed under the error, if the user can fix it
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingApiKey => Some("Please create a .env file with:\nOPENAI_API_KEY='your-key-here'"),
            Self::AvatarNotFound(_) => Some("Please add an avatar image to:\ndata/images/avatar.png"),
            Self::ProcessStart { .. } => {
                Some("Check that the Python environment exists (venv/bin/python3) or pass --python")
            }
            _ => None,
        }
    }
}

/// Result type for the atenea library
pub type Result<T> = std::result::Result<T, AvatarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_failure_message_carries_code_and_stderr() {
        let err = AvatarError::VideoSynthesis {
            code: 3,
            stderr: "CUDA out of memory\n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("code 3"));
        assert!(msg.contains("CUDA out of memory\n"));
    }

    #[test]
    fn hints_only_for_user_fixable_errors() {
        assert!(AvatarError::MissingApiKey.hint().unwrap().contains("OPENAI_API_KEY"));
        assert!(AvatarError::AvatarNotFound(PathBuf::from("a.png"))
            .hint()
            .unwrap()
            .contains("data/images/avatar.png"));
        assert!(AvatarError::SpeechSynthesis("quota".into()).hint().is_none());
    }
}
