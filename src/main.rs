//! snap-solver
//!
//! Photographs a coding exercise (or reads an image file), recovers the
//! problem with local OCR or a vision model, asks a language model for a
//! solution and writes it next to the capture.

mod capture;
mod cli;
mod config;
mod error;
mod llm;
mod logging;
mod model;
mod ocr;
mod output;
mod paths;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

use capture::{
    CameraSource, CameraTiming, CameraType, DEFAULT_CAMERA_URL, FileSource, ImageSource,
    StdinGestures, open_camera, probe,
};
use cli::{CaptureArgs, Cli, Command};
use config::AppConfig;
use llm::{LlmClient, ProviderConfig, ProviderKind, SolutionRequester, resolve_api_key};
use ocr::TesseractExtractor;
use output::OutputSink;
use paths::{CAMERA_CONFIG_FILE, read_camera_config};
use pipeline::{OcrPipeline, VisionPipeline, run_capture_loop};

const CAMERA_SAMPLE_DIR: &str = "camera_test";

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = config::load_config(cli.config.as_deref());

    match cli.command {
        Command::Solve(args) => run_solve(&config, &args),
        Command::Vision(args) => run_vision(&config, &args),
        Command::SelectCamera { max_cameras } => run_select_camera(&config, max_cameras),
    }
}

fn open_source(config: &AppConfig, args: &CaptureArgs) -> Result<Box<dyn ImageSource>> {
    if let Some(path) = &args.image_path {
        return Ok(Box::new(FileSource::new(path)));
    }

    let camera_id = args.camera_id(read_camera_config(Path::new(CAMERA_CONFIG_FILE)));
    log::info!("Opening {:?} camera {}", args.camera_type, camera_id);
    let warmup = Duration::from_millis(config.warmup_ms);
    let grabber = open_camera(args.camera_type, camera_id, &args.camera_url, warmup)?;

    let timing = CameraTiming {
        warmup,
        interval: Duration::from_secs(args.interval),
        gesture_timeout: Duration::from_secs(config.gesture_timeout_secs),
    };
    Ok(Box::new(CameraSource::new(
        grabber,
        Box::new(StdinGestures::spawn()),
        &args.output_dir(),
        timing,
    )))
}

fn output_sink(config: &AppConfig, args: &CaptureArgs) -> OutputSink {
    let editor = if args.no_editor {
        None
    } else {
        config.editor.clone()
    };
    OutputSink::new(args.output_dir(), &config.solution_extension, editor)
}

fn run_solve(config: &AppConfig, args: &CaptureArgs) -> Result<()> {
    let provider = args.provider_or(ProviderKind::OpenAi);
    let extractor =
        TesseractExtractor::discover(config.tesseract_path.as_deref(), config.ocr_threshold)?;

    let requester = match resolve_api_key(provider, args.api_key.clone()) {
        Some(key) => {
            let client = LlmClient::new(ProviderConfig::from_app(provider, key, config))?;
            Some(SolutionRequester::new(client, config.language.clone()))
        }
        None => {
            log::warn!(
                "No API key for {} (pass --api-key or set {}); only the extracted problem will be saved",
                provider,
                provider.env_var()
            );
            None
        }
    };

    let pipeline = OcrPipeline::new(Box::new(extractor), requester, output_sink(config, args));
    let mut source = open_source(config, args)?;
    let solved = run_capture_loop(source.as_mut(), &pipeline, args.continuous)?;
    log::info!("Finished: {} capture(s) processed", solved);
    Ok(())
}

fn run_vision(config: &AppConfig, args: &CaptureArgs) -> Result<()> {
    let provider = args.provider_or(ProviderKind::Claude);
    let key = resolve_api_key(provider, args.api_key.clone()).with_context(|| {
        format!(
            "No API key for {}: pass --api-key or set {}",
            provider,
            provider.env_var()
        )
    })?;

    let client = LlmClient::new(ProviderConfig::from_app(provider, key, config))?;
    let pipeline = VisionPipeline::new(client, output_sink(config, args));
    let mut source = open_source(config, args)?;
    let solved = run_capture_loop(source.as_mut(), &pipeline, args.continuous)?;
    log::info!("Finished: {} capture(s) processed", solved);
    Ok(())
}

fn run_select_camera(config: &AppConfig, max_cameras: u32) -> Result<()> {
    let warmup = Duration::from_millis(config.warmup_ms);
    let id = probe::select_camera(
        max_cameras,
        Path::new(CAMERA_SAMPLE_DIR),
        Path::new(CAMERA_CONFIG_FILE),
        std::io::stdin().lock(),
        |id| open_camera(CameraType::Usb, id, DEFAULT_CAMERA_URL, warmup),
    )?;
    log::info!(
        "Camera {} will be used by solve and vision unless --camera-id is given",
        id
    );
    Ok(())
}
