//! atenea: talking avatar videos from text
//!
//! Reads a text file, turns it into speech with the OpenAI speech API and
//! hands the audio plus an avatar image to an external talking-head model
//! (SadTalker or Hallo2) that renders the final video.

pub mod config;
pub mod error;
pub mod notification;
pub mod pipeline;
pub mod progress;
pub mod tts;
pub mod utils;
pub mod validate;
pub mod video;

pub use config::{AppConfig, TtsVoice, VideoModel};
pub use error::{AvatarError, Result};
pub use pipeline::{AvatarPipeline, GenerationOutcome, GenerationRequest};
pub use progress::{ProcessStep, ProgressInfo, ProgressObserver, ProgressTracker, StepState};
pub use tts::{SpeechClientProvider, SpeechSynthesisOptions};
pub use video::{ProcessResult, VideoRunner, VideoSynthesisParameters};
