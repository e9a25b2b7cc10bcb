//! Configuration for the avatar generator
//!
//! Voice and video model selectors, default paths, and the settings read
//! from the environment (`OPENAI_API_KEY`, `OPENAI_BASE_URL`, `TTS_MODEL`).

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::AvatarError;

/// Default OpenAI API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default speech model
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_INPUT_PATH: &str = "input.txt";
pub const DEFAULT_AVATAR_PATH: &str = "data/images/avatar.png";
pub const DEFAULT_OUTPUT_PATH: &str = "output.mp4";
pub const DEFAULT_AUDIO_DIR: &str = "data/audio";
/// Interpreter of the bundled Python environment
pub const DEFAULT_PYTHON: &str = "venv/bin/python3";
/// Entry point of the talking-head generator
pub const DEFAULT_VIDEO_SCRIPT: &str = "python/generate_video.py";

/// Voice preset offered by the OpenAI speech API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsVoice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Shimmer,
}

impl TtsVoice {
    /// All presets, in the order the API documents them
    pub const ALL: [TtsVoice; 6] = [
        Self::Alloy,
        Self::Echo,
        Self::Fable,
        Self::Onyx,
        Self::Nova,
        Self::Shimmer,
    ];

    /// Name sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for TtsVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsVoice {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|voice| voice.as_str() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(TtsVoice::as_str).collect();
                AvatarError::Configuration(format!(
                    "Unknown voice '{}'. Available voices: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Talking-head model run by the external video generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoModel {
    #[default]
    SadTalker,
    Hallo2,
}

impl VideoModel {
    /// Value of the `--model` flag passed to the generator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SadTalker => "sadtalker",
            Self::Hallo2 => "hallo2",
        }
    }
}

impl fmt::Display for VideoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoModel {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sadtalker" => Ok(Self::SadTalker),
            "hallo2" => Ok(Self::Hallo2),
            other => Err(AvatarError::Configuration(format!(
                "Unsupported video model '{}'. Supported models: sadtalker, hallo2",
                other
            ))),
        }
    }
}

/// Settings taken from the process environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenAI API key; `None` when not configured
    pub api_key: Option<String>,
    /// Base URL of the OpenAI API
    pub base_url: String,
    /// Speech model name
    pub tts_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            tts_model: get("TTS_MODEL").unwrap_or(defaults.tts_model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn voices_parse_case_insensitively() {
        assert_eq!("nova".parse::<TtsVoice>().unwrap(), TtsVoice::Nova);
        assert_eq!(" Shimmer ".parse::<TtsVoice>().unwrap(), TtsVoice::Shimmer);
        for voice in TtsVoice::ALL {
            assert_eq!(voice.as_str().parse::<TtsVoice>().unwrap(), voice);
        }
    }

    #[test]
    fn unknown_voice_lists_presets() {
        let err = "robot".parse::<TtsVoice>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("robot"));
        assert!(msg.contains("alloy, echo, fable, onyx, nova, shimmer"));
    }

    #[test]
    fn video_model_defaults_to_sadtalker() {
        assert_eq!(VideoModel::default(), VideoModel::SadTalker);
        assert_eq!("HALLO2".parse::<VideoModel>().unwrap(), VideoModel::Hallo2);
        assert!("wav2lip".parse::<VideoModel>().is_err());
    }

    #[test]
    fn config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("TTS_MODEL", "tts-1-hd"),
            ("OPENAI_BASE_URL", "  "),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tts_model, "tts-1-hd");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn config_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert!(config.api_key.is_none());
        assert_eq!(config.tts_model, DEFAULT_TTS_MODEL);
    }
}
