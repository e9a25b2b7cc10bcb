//! Text-to-speech
//!
//! Turns the input text into an audio file using the OpenAI speech API.

pub mod openai;

use std::path::{Path, PathBuf};
use crate::config::TtsVoice;

pub use openai::{generate_speech, OpenAiSpeechClient, SpeechClientProvider};

/// Parameters of a single speech synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSynthesisOptions {
    /// Text to speak
    pub text: String,
    /// Voice preset
    pub voice: TtsVoice,
    /// Speech model name (`tts-1`, `tts-1-hd`, ...)
    pub model: String,
    /// Where the audio is written
    pub output_audio_path: PathBuf,
}

impl SpeechSynthesisOptions {
    /// Options writing into `audio_dir` under a name derived from the request
    pub fn in_dir(text: impl Into<String>, voice: TtsVoice, model: impl Into<String>, audio_dir: &Path) -> Self {
        let text = text.into();
        let model = model.into();
        let output_audio_path = audio_dir.join(speech_file_name(&model, voice, &text));
        Self {
            text,
            voice,
            model,
            output_audio_path,
        }
    }
}

/// File name for the audio of a request
///
/// Identical model, voice and text always map to the same name.
pub fn speech_file_name(model: &str, voice: TtsVoice, text: &str) -> String {
    let mut hasher = md5::Context::new();
    hasher.consume(model.as_bytes());
    hasher.consume([0u8]);
    hasher.consume(voice.as_str().as_bytes());
    hasher.consume([0u8]);
    hasher.consume(text.as_bytes());

    format!("speech_{:x}.mp3", hasher.compute())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_stable_per_request() {
        let a = speech_file_name("tts-1", TtsVoice::Nova, "Hello world");
        let b = speech_file_name("tts-1", TtsVoice::Nova, "Hello world");
        assert_eq!(a, b);
        assert!(a.starts_with("speech_"));
        assert!(a.ends_with(".mp3"));
        // "speech_" + 32 hex digits + ".mp3"
        assert_eq!(a.len(), 7 + 32 + 4);
    }

    #[test]
    fn file_name_depends_on_every_input() {
        let base = speech_file_name("tts-1", TtsVoice::Nova, "Hello world");
        assert_ne!(base, speech_file_name("tts-1-hd", TtsVoice::Nova, "Hello world"));
        assert_ne!(base, speech_file_name("tts-1", TtsVoice::Echo, "Hello world"));
        assert_ne!(base, speech_file_name("tts-1", TtsVoice::Nova, "Hello world!"));
    }

    #[test]
    fn options_land_in_audio_dir() {
        let options = SpeechSynthesisOptions::in_dir("Hi", TtsVoice::Alloy, "tts-1", Path::new("data/audio"));
        assert_eq!(options.output_audio_path.parent(), Some(Path::new("data/audio")));
        assert_eq!(options.model, "tts-1");
        assert_eq!(options.voice, TtsVoice::Alloy);
    }
}
