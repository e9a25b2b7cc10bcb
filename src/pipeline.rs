//! Avatar video generation pipeline
//!
//! Runs validation, speech synthesis and video synthesis strictly in that
//! order. The first failing stage ends the run; its error is returned as is.

use std::future::Future;
use std::path::PathBuf;

use crate::config::{
    AppConfig, TtsVoice, VideoModel, DEFAULT_AUDIO_DIR, DEFAULT_AVATAR_PATH, DEFAULT_INPUT_PATH,
    DEFAULT_OUTPUT_PATH,
};
use crate::error::Result;
use crate::progress::{ProcessStep, ProgressObserver, ProgressTracker};
use crate::tts::{generate_speech, SpeechClientProvider, SpeechSynthesisOptions};
use crate::utils::paths::{display_name, resolve_path};
use crate::validate::{parse_voice, read_input_text, require_api_key, require_avatar};
use crate::video::{generate_video, VideoRunner, VideoSynthesisParameters};

/// One invocation of the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub input_text_path: PathBuf,
    pub avatar_image_path: PathBuf,
    pub output_video_path: PathBuf,
    /// Voice preset name, checked during validation
    pub voice: String,
    /// Talking-head model name, checked during validation
    pub model_variant: Option<String>,
    /// Directory receiving the synthesized speech
    pub audio_dir: PathBuf,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            input_text_path: PathBuf::from(DEFAULT_INPUT_PATH),
            avatar_image_path: PathBuf::from(DEFAULT_AVATAR_PATH),
            output_video_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            voice: TtsVoice::default().as_str().to_string(),
            model_variant: None,
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
        }
    }
}

impl GenerationRequest {
    /// Same request with every path made absolute against the current directory
    pub fn resolved(self) -> std::io::Result<Self> {
        Ok(Self {
            input_text_path: resolve_path(&self.input_text_path)?,
            avatar_image_path: resolve_path(&self.avatar_image_path)?,
            output_video_path: resolve_path(&self.output_video_path)?,
            audio_dir: resolve_path(&self.audio_dir)?,
            ..self
        })
    }
}

/// Artifacts of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    /// Length of the input text in characters
    pub text_chars: usize,
}

/// Inputs that passed validation
struct ValidatedInput {
    text: String,
    voice: TtsVoice,
    model_variant: Option<VideoModel>,
}

/// Text → speech → talking-head video
pub struct AvatarPipeline {
    config: AppConfig,
    speech: SpeechClientProvider,
    runner: VideoRunner,
    tracker: ProgressTracker,
}

impl AvatarPipeline {
    pub fn new(config: AppConfig, runner: VideoRunner) -> Self {
        let speech = SpeechClientProvider::from_config(&config);
        Self {
            config,
            speech,
            runner,
            tracker: ProgressTracker::new(),
        }
    }

    /// Register a progress observer
    pub fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.tracker.add_observer(observer);
    }

    /// Speech client shared by every run of this pipeline
    pub fn speech_client(&self) -> &SpeechClientProvider {
        &self.speech
    }

    /// Run the whole pipeline for `request`
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        log::info!("Starting avatar video generation");

        let input = self.stage(ProcessStep::Validation, self.validate(request)).await?;
        let text_chars = input.text.chars().count();
        self.tracker.finish_step(
            ProcessStep::Validation,
            format!(
                "Using voice {} and {} model",
                input.voice,
                input.model_variant.unwrap_or_default().as_str().to_uppercase()
            ),
        );

        self.tracker
            .start_step(ProcessStep::SpeechGeneration, "Generating speech from text...");
        let options = SpeechSynthesisOptions::in_dir(
            input.text,
            input.voice,
            self.config.tts_model.as_str(),
            &request.audio_dir,
        );
        let audio_path = self
            .stage(ProcessStep::SpeechGeneration, generate_speech(&self.speech, &options))
            .await?;
        self.tracker.finish_step(ProcessStep::SpeechGeneration, "Speech generated");

        self.tracker.start_step(
            ProcessStep::VideoGeneration,
            "Generating talking head video (this can take several minutes per minute of audio)...",
        );
        let params = VideoSynthesisParameters {
            image_path: request.avatar_image_path.clone(),
            audio_path: audio_path.clone(),
            output_path: request.output_video_path.clone(),
            model_variant: input.model_variant,
        };
        let video_path = self
            .stage(ProcessStep::VideoGeneration, generate_video(&self.runner, &params))
            .await?;
        self.tracker
            .finish_step(ProcessStep::VideoGeneration, "Video generated successfully!");

        log::info!("Avatar video generation completed");
        Ok(GenerationOutcome {
            video_path,
            audio_path,
            text_chars,
        })
    }

    async fn validate(&self, request: &GenerationRequest) -> Result<ValidatedInput> {
        self.tracker.start_step(ProcessStep::Validation, "Reading input text...");
        require_api_key(self.config.api_key.as_deref())?;

        let text = read_input_text(&request.input_text_path).await?;
        self.tracker.succeed_step(
            ProcessStep::Validation,
            format!("Input text loaded ({} characters)", text.chars().count()),
        );

        require_avatar(&request.avatar_image_path).await?;
        self.tracker.succeed_step(
            ProcessStep::Validation,
            format!("Avatar image found: {}", display_name(&request.avatar_image_path)),
        );

        let voice = parse_voice(&request.voice)?;
        let model_variant = request
            .model_variant
            .as_deref()
            .map(str::parse::<VideoModel>)
            .transpose()?;

        Ok(ValidatedInput {
            text,
            voice,
            model_variant,
        })
    }

    /// Await a stage and report its failure to the observers
    async fn stage<T, F>(&self, step: ProcessStep, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = fut.await;
        if let Err(e) = &result {
            log::debug!("{} failed: {}", step.as_str(), e);
            self.tracker.fail_step(step, format!("{} failed", step.as_str()));
        }
        result
    }
}
