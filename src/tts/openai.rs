//! OpenAI speech API integration
//!
//! [`SpeechClientProvider`] is created once per process and handed to
//! [`generate_speech`]; it builds the HTTP client on first use and reuses
//! it afterwards.

use std::path::PathBuf;
use bytes::Bytes;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::Serialize;
use crate::config::{AppConfig, DEFAULT_BASE_URL};
use crate::error::{AvatarError, Result};
use crate::tts::SpeechSynthesisOptions;
use crate::validate::require_api_key;

/// Body of `POST /audio/speech`
#[derive(Debug, Serialize)]
struct SpeechRequestBody<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

/// Client for the OpenAI speech endpoint
pub struct OpenAiSpeechClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiSpeechClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Full URL of the speech endpoint
    pub fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.base_url.trim_end_matches('/'))
    }

    /// Request speech for `input` and return the raw audio bytes
    pub async fn create_speech(&self, model: &str, voice: &str, input: &str) -> Result<Bytes> {
        log::info!("Sending TTS request to OpenAI API (model: {}, voice: {})", model, voice);

        let response = self
            .client
            .post(self.speech_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&SpeechRequestBody { model, voice, input })
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send TTS request: {}", e);
                AvatarError::SpeechSynthesis(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("Failed to read error response: {}", e),
            };
            log::error!("OpenAI API error (status {}): {}", status, error_text);
            return Err(AvatarError::SpeechSynthesis(format!(
                "{} {}",
                status.as_u16(),
                upstream_message(&error_text)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AvatarError::SpeechSynthesis(format!("Failed to read audio response: {}", e)))?;
        log::debug!("Received {} bytes of audio", bytes.len());
        Ok(bytes)
    }
}

/// Extract `error.message` from an OpenAI error body, falling back to the raw body
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Lazily-initialised speech client
pub struct SpeechClientProvider {
    api_key: Option<String>,
    base_url: String,
    client: OnceCell<OpenAiSpeechClient>,
}

impl SpeechClientProvider {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            client: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_key.clone(), config.base_url.clone())
    }

    /// The shared client, built on the first call
    ///
    /// Fails without touching the network when no API key is configured.
    pub fn client(&self) -> Result<&OpenAiSpeechClient> {
        self.client.get_or_try_init(|| {
            let api_key = require_api_key(self.api_key.as_deref())?;
            log::debug!("Creating OpenAI client for {}", self.base_url);
            Ok(OpenAiSpeechClient::new(api_key, self.base_url.clone()))
        })
    }

    /// Whether the client has been built yet
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

impl Default for SpeechClientProvider {
    fn default() -> Self {
        Self::new(None, DEFAULT_BASE_URL)
    }
}

/// Synthesize `options.text` and write the audio to `options.output_audio_path`
///
/// Creates the destination directory when needed and returns the written path.
pub async fn generate_speech(
    provider: &SpeechClientProvider,
    options: &SpeechSynthesisOptions,
) -> Result<PathBuf> {
    let client = provider.client()?;

    if options.text.trim().is_empty() {
        return Err(AvatarError::InvalidInput("input text is empty".to_string()));
    }

    log::info!("Generating speech with voice: {}", options.voice);
    let audio = client
        .create_speech(&options.model, options.voice.as_str(), &options.text)
        .await?;

    if let Some(parent) = options.output_audio_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&options.output_audio_path, &audio).await?;

    log::info!("Audio generated: {}", options.output_audio_path.display());
    Ok(options.output_audio_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TtsVoice;
    use mockito::Matcher;
    use serde_json::json;

    fn options(dir: &std::path::Path, text: &str) -> SpeechSynthesisOptions {
        SpeechSynthesisOptions {
            text: text.to_string(),
            voice: TtsVoice::Nova,
            model: "tts-1".to_string(),
            output_audio_path: dir.join("nested").join("audio").join("speech.mp3"),
        }
    }

    #[tokio::test]
    async fn writes_response_bytes_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let audio: Vec<u8> = vec![0xFF, 0xFB, 0x90, 0x00, 0x01, 0x02, 0x03];
        let mock = server
            .mock("POST", "/audio/speech")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "tts-1",
                "voice": "nova",
                "input": "Hello world"
            })))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(audio.clone())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = SpeechClientProvider::new(Some("sk-test".into()), server.url());
        let opts = options(dir.path(), "Hello world");

        let path = generate_speech(&provider, &opts).await.unwrap();

        mock.assert_async().await;
        assert_eq!(path, opts.output_audio_path);
        assert_eq!(std::fs::read(&path).unwrap(), audio);
    }

    #[tokio::test]
    async fn upstream_error_message_is_relayed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/audio/speech")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = SpeechClientProvider::new(Some("sk-test".into()), server.url());
        let opts = options(dir.path(), "Hello world");

        let err = generate_speech(&provider, &opts).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AvatarError::SpeechSynthesis(_)));
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("You exceeded your current quota"));
        assert!(!opts.output_audio_path.exists());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/audio/speech")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = SpeechClientProvider::new(None, server.url());

        let err = generate_speech(&provider, &options(dir.path(), "Hello")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AvatarError::MissingApiKey));
        assert!(!provider.is_initialized());
    }

    #[tokio::test]
    async fn empty_text_is_rejected_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/audio/speech")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = SpeechClientProvider::new(Some("sk-test".into()), server.url());

        let err = generate_speech(&provider, &options(dir.path(), "  \n")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AvatarError::InvalidInput(_)));
    }

    #[test]
    fn client_is_built_once() {
        let provider = SpeechClientProvider::new(Some("sk-test".into()), "http://localhost:1/v1/");
        assert!(!provider.is_initialized());

        let first = provider.client().unwrap() as *const OpenAiSpeechClient;
        let second = provider.client().unwrap() as *const OpenAiSpeechClient;

        assert!(provider.is_initialized());
        assert_eq!(first, second);
        assert_eq!(provider.client().unwrap().speech_url(), "http://localhost:1/v1/audio/speech");
    }

    #[test]
    fn upstream_message_falls_back_to_body() {
        assert_eq!(upstream_message(r#"{"error":{"message":"Invalid voice"}}"#), "Invalid voice");
        assert_eq!(upstream_message("Bad Gateway\n"), "Bad Gateway");
    }
}
