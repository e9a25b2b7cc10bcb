//! Talking-head video generation
//!
//! The video is produced by an external Python program. This module only
//! launches it with the avatar image and the generated audio, relays its
//! output and checks the exit code.

pub mod process;

use std::path::PathBuf;
use tokio::process::Command;
use crate::config::{VideoModel, DEFAULT_PYTHON, DEFAULT_VIDEO_SCRIPT};
use crate::error::{AvatarError, Result};

pub use process::{run_streaming, ProcessResult, RunError};

/// Inputs of a video generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSynthesisParameters {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    /// Talking-head model; the generator's default (SadTalker) when `None`
    pub model_variant: Option<VideoModel>,
}

/// Location of the external video generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRunner {
    /// Interpreter used to run the script
    pub python: PathBuf,
    /// Generator entry point
    pub script: PathBuf,
}

impl Default for VideoRunner {
    fn default() -> Self {
        Self {
            python: PathBuf::from(DEFAULT_PYTHON),
            script: PathBuf::from(DEFAULT_VIDEO_SCRIPT),
        }
    }
}

impl VideoRunner {
    pub fn new(python: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
        }
    }

    /// Command line arguments passed to the interpreter
    pub fn args(&self, params: &VideoSynthesisParameters) -> Vec<std::ffi::OsString> {
        let model = params.model_variant.unwrap_or_default();
        vec![
            self.script.clone().into_os_string(),
            "--image".into(),
            params.image_path.clone().into_os_string(),
            "--audio".into(),
            params.audio_path.clone().into_os_string(),
            "--output".into(),
            params.output_path.clone().into_os_string(),
            "--model".into(),
            model.as_str().into(),
        ]
    }

    fn command(&self, params: &VideoSynthesisParameters) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.args(self.args(params));
        cmd
    }
}

/// Run the external generator and wait for it to finish
///
/// Resolves with `params.output_path` as given when the generator exits with
/// code 0; the output file itself is not checked.
pub async fn generate_video(runner: &VideoRunner, params: &VideoSynthesisParameters) -> Result<PathBuf> {
    let model = params.model_variant.unwrap_or_default();
    log::info!("Starting video generation");
    log::info!("  Model: {}", model.as_str().to_uppercase());
    log::info!("  Image: {}", params.image_path.display());
    log::info!("  Audio: {}", params.audio_path.display());
    log::info!("  Output: {}", params.output_path.display());

    let result = run_streaming(runner.command(params))
        .await
        .map_err(|e| run_error(runner, e))?;

    check_exit(result)?;
    log::info!("Video generation completed successfully");
    Ok(params.output_path.clone())
}

fn run_error(runner: &VideoRunner, err: RunError) -> AvatarError {
    match err {
        RunError::Spawn(source) => {
            log::error!("Failed to spawn {}: {}", runner.python.display(), source);
            AvatarError::ProcessStart {
                program: runner.python.clone(),
                source,
            }
        }
        RunError::Io(source) => {
            log::error!("Lost contact with video generation process: {}", source);
            AvatarError::Io(source)
        }
    }
}

fn check_exit(result: ProcessResult) -> Result<()> {
    if result.success() {
        return Ok(());
    }
    match result.exit_code {
        Some(code) => {
            log::error!("Video generation failed with code {}", code);
            Err(AvatarError::VideoSynthesis {
                code,
                stderr: result.stderr,
            })
        }
        None => {
            log::error!("Video generation process was terminated by a signal");
            Err(AvatarError::VideoTerminated { stderr: result.stderr })
        }
    }
}
