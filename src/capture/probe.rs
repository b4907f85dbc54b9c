//! Interactive camera selection: grab one frame from every device so the user
//! can tell which one points at the screen.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::device::FrameGrabber;
use crate::error::SolverResult;
use crate::paths::write_camera_config;

pub const DEFAULT_MAX_CAMERAS: u32 = 5;

/// A device that delivered a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedCamera {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub sample: PathBuf,
}

/// Tries ids `0..max` and saves `camera_<id>_sample.png` for each working one.
pub fn probe_cameras<F>(max: u32, sample_dir: &Path, mut open: F) -> Result<Vec<ProbedCamera>>
where
    F: FnMut(u32) -> SolverResult<Box<dyn FrameGrabber>>,
{
    fs::create_dir_all(sample_dir)
        .with_context(|| format!("Failed to create {}", sample_dir.display()))?;

    let mut found = Vec::new();
    for id in 0..max {
        let mut camera = match open(id) {
            Ok(camera) => camera,
            Err(e) => {
                log::info!("Camera {}: not available ({})", id, e);
                continue;
            }
        };

        let frame = match camera.grab() {
            Ok(frame) => frame,
            Err(e) => {
                log::info!("Camera {}: connected but no frame ({})", id, e);
                continue;
            }
        };

        let sample = sample_dir.join(format!("camera_{}_sample.png", id));
        frame
            .save(&sample)
            .with_context(|| format!("Failed to save {}", sample.display()))?;

        log::info!(
            "Camera {}: working, {}x{}, sample saved to {}",
            id,
            frame.width(),
            frame.height(),
            sample.display()
        );
        found.push(ProbedCamera {
            id,
            width: frame.width(),
            height: frame.height(),
            sample,
        });
    }
    Ok(found)
}

/// One line per working camera, for the selection prompt.
fn camera_menu(found: &[ProbedCamera]) -> String {
    found
        .iter()
        .map(|camera| {
            format!(
                "  {}: {}x{}  {}",
                camera.id,
                camera.width,
                camera.height,
                camera.sample.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Probes every camera, asks for an id on `input`, confirms the device with one
/// more frame and records it in `config_path`.
pub fn select_camera<F, R>(
    max: u32,
    sample_dir: &Path,
    config_path: &Path,
    mut input: R,
    mut open: F,
) -> Result<u32>
where
    F: FnMut(u32) -> SolverResult<Box<dyn FrameGrabber>>,
    R: BufRead,
{
    let found = probe_cameras(max, sample_dir, &mut open)?;
    if found.is_empty() {
        bail!("No working camera found among ids 0..{}", max);
    }

    log::info!(
        "Working cameras:\n{}\nCheck the samples and enter the id of the camera facing the screen:",
        camera_menu(&found)
    );
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read camera id")?;
    let id: u32 = line
        .trim()
        .parse()
        .with_context(|| format!("Invalid camera id {:?}", line.trim()))?;
    if !found.iter().any(|camera| camera.id == id) {
        log::warn!("Camera {} gave no sample; trying it anyway", id);
    }

    let mut camera = open(id).with_context(|| format!("Could not open camera {}", id))?;
    let frame = camera
        .grab()
        .with_context(|| format!("Camera {} did not deliver a frame", id))?;
    log::info!("Camera {} confirmed ({}x{})", id, frame.width(), frame.height());

    write_camera_config(config_path, id)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    log::info!("Saved camera id to {}", config_path.display());
    Ok(id)
}
