use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use atenea::config::{
    DEFAULT_AUDIO_DIR, DEFAULT_AVATAR_PATH, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_PYTHON,
    DEFAULT_VIDEO_SCRIPT,
};
use atenea::notification::ConsoleProgressObserver;
use atenea::utils::{logger, paths};
use atenea::{AppConfig, AvatarError, AvatarPipeline, GenerationRequest, VideoRunner};

#[derive(Debug, Parser)]
#[command(name = "atenea", version)]
#[command(about = "AI avatar video generator: text to talking-head video")]
struct Cli {
    /// Debug-level logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a talking head video from text input
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Input text file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Avatar image path
    #[arg(short, long, value_name = "IMAGE", default_value = DEFAULT_AVATAR_PATH)]
    avatar: PathBuf,

    /// Output video path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// TTS voice (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(short, long, env = "TTS_VOICE", default_value = "nova")]
    voice: String,

    /// Talking-head model (sadtalker, hallo2)
    #[arg(short, long, env = "ATENEA_VIDEO_MODEL")]
    model: Option<String>,

    /// Directory for the generated speech
    #[arg(long, value_name = "DIR", default_value = DEFAULT_AUDIO_DIR)]
    audio_dir: PathBuf,

    /// Python interpreter running the video generator
    #[arg(long, env = "ATENEA_PYTHON", default_value = DEFAULT_PYTHON)]
    python: PathBuf,

    /// Video generator script
    #[arg(long, env = "ATENEA_VIDEO_SCRIPT", default_value = DEFAULT_VIDEO_SCRIPT)]
    script: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Values already in the environment win over .env
    let dotenv = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_exit(e),
    };
    logger::init_logger(cli.verbose);

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring .env file: {}", e),
    }

    let result = match cli.command {
        Commands::Generate(args) => generate(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AvatarError>() {
                // Pipeline errors already carry their cause in the message
                Some(avatar_err) => {
                    eprintln!("\n✖ Error: {}", avatar_err);
                    if let Some(hint) = avatar_err.hint() {
                        eprintln!("\n{}", hint);
                    }
                }
                None => eprintln!("\n✖ Error: {:#}", err),
            }
            ExitCode::from(1)
        }
    }
}

/// Help and version exit 0; every usage error exits 1 like a failed run
fn usage_exit(err: clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::from(1),
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let request = GenerationRequest {
        input_text_path: args.input,
        avatar_image_path: args.avatar,
        output_video_path: args.output,
        voice: args.voice,
        model_variant: args.model,
        audio_dir: args.audio_dir,
    }
    .resolved()
    .context("Failed to resolve paths against the current directory")?;

    let runner = VideoRunner::new(resolve_program(args.python)?, paths::resolve_path(&args.script)?);

    let mut pipeline = AvatarPipeline::new(AppConfig::from_env(), runner);
    pipeline.add_observer(Box::new(ConsoleProgressObserver::new()));

    println!("\n🎬 Starting video generation\n");
    let outcome = pipeline.run(&request).await?;

    println!("\n✅ Success!\n");
    println!("Video saved to: {}", outcome.video_path.display());
    println!("Audio saved to: {}", outcome.audio_path.display());
    println!("Text length: {} characters", outcome.text_chars);
    println!("\nOpen video: open \"{}\"", outcome.video_path.display());
    Ok(())
}

/// Bare program names are looked up on `PATH`; anything else is a path
fn resolve_program(program: PathBuf) -> Result<PathBuf> {
    if program.components().count() > 1 {
        Ok(paths::resolve_path(&program)?)
    } else {
        Ok(program)
    }
}
