use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::capture::{CameraType, DEFAULT_CAMERA_URL};
use crate::capture::probe::DEFAULT_MAX_CAMERAS;
use crate::config::Profile;
use crate::llm::ProviderKind;

/// Camera id used when nothing else picks one: the phone's back camera.
const FALLBACK_CAMERA_ID: u32 = 1;
const FALLBACK_OUTPUT_DIR: &str = "solutions";

/// snap-solver - photograph a coding problem, get a solution file
#[derive(Parser, Debug)]
#[command(
    name = "snap-solver",
    version,
    about = "Capture a coding problem from a camera or image and generate a solution",
    after_help = "ENVIRONMENT VARIABLES:\n\
        OPENAI_API_KEY       API key for --provider openai\n\
        ANTHROPIC_API_KEY    API key for --provider claude\n\
        GOOGLE_API_KEY       API key for --provider gemini\n\
        RUST_LOG             Log filter (default: info)"
)]
pub struct Cli {
    /// Config file (default: config.json next to the executable, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the problem with local OCR, then ask a text model for the code
    Solve(CaptureArgs),

    /// Send the whole image to a vision model that returns problem and code
    Vision(CaptureArgs),

    /// Save a sample frame from every camera and record the one to use
    SelectCamera {
        /// Number of camera ids to try, starting at 0
        #[arg(long, default_value_t = DEFAULT_MAX_CAMERAS)]
        max_cameras: u32,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CaptureArgs {
    /// Provider API key (falls back to the provider's environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Camera device id (default: profile, then camera_config.txt, then 1)
    #[arg(long)]
    pub camera_id: Option<u32>,

    /// Process an existing image instead of capturing
    #[arg(long)]
    pub image_path: Option<PathBuf>,

    /// Where captures and solutions are written (default: profile, then "solutions")
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "usb")]
    pub camera_type: CameraType,

    /// Snapshot URL for --camera-type ip
    #[arg(long, default_value = DEFAULT_CAMERA_URL)]
    pub camera_url: String,

    /// Minimum seconds between captures
    #[arg(long, default_value_t = 3)]
    pub interval: u64,

    /// Keep capturing after each solution
    #[arg(long)]
    pub continuous: bool,

    /// Named camera/output defaults
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Don't open the solution in an editor
    #[arg(long)]
    pub no_editor: bool,

    /// Model provider (default: openai for solve, claude for vision)
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,
}

impl CaptureArgs {
    /// `--camera-id`, then the profile, then the id saved by `select-camera`.
    pub fn camera_id(&self, saved: Option<u32>) -> u32 {
        self.camera_id
            .or(self.profile.map(Profile::camera_id))
            .or(saved)
            .unwrap_or(FALLBACK_CAMERA_ID)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| self.profile.map(Profile::output_dir))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_OUTPUT_DIR))
    }

    pub fn provider_or(&self, default: ProviderKind) -> ProviderKind {
        self.provider.unwrap_or(default)
    }
}
