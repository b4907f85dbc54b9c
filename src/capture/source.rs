use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use super::convert::ensure_decodable;
use super::device::FrameGrabber;
use super::gesture::{Gesture, GestureSource};
use super::{CaptureEvent, ImageSource};
use crate::error::{SolverError, SolverResult};
use crate::paths::{capture_name, capture_path, unique_capture_name};

/// A single image already on disk.
pub struct FileSource {
    path: PathBuf,
    consumed: bool,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            consumed: false,
        }
    }
}

impl ImageSource for FileSource {
    fn capture(&mut self) -> SolverResult<Option<CaptureEvent>> {
        if self.consumed {
            return Ok(None);
        }
        self.consumed = true;

        if !self.path.exists() {
            return Err(SolverError::NotFound(self.path.clone()));
        }

        let readable = ensure_decodable(&self.path);
        let image = image::open(&readable)?.to_rgba8();
        let name = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(capture_name);

        log::info!(
            "Loaded {} ({}x{})",
            readable.display(),
            image.width(),
            image.height()
        );
        Ok(Some(CaptureEvent {
            image,
            name,
            path: readable,
        }))
    }
}

/// Timing knobs for a camera source.
#[derive(Clone, Copy, Debug)]
pub struct CameraTiming {
    /// Minimum delay between opening the device and the first frame
    pub warmup: Duration,
    /// Minimum spacing between consecutive captures
    pub interval: Duration,
    /// How long to wait for a gesture before giving up
    pub gesture_timeout: Duration,
}

/// Live camera: waits for the user, then grabs and saves a frame.
pub struct CameraSource {
    grabber: Box<dyn FrameGrabber>,
    gestures: Box<dyn GestureSource>,
    output_dir: PathBuf,
    timing: CameraTiming,
    opened_at: Instant,
    last_capture: Option<Instant>,
}

impl CameraSource {
    pub fn new(
        grabber: Box<dyn FrameGrabber>,
        gestures: Box<dyn GestureSource>,
        output_dir: &Path,
        timing: CameraTiming,
    ) -> Self {
        log::info!("Camera ready: {}", grabber.describe());
        Self {
            grabber,
            gestures,
            output_dir: output_dir.to_path_buf(),
            timing,
            opened_at: Instant::now(),
            last_capture: None,
        }
    }

    fn wait_until_ready(&self) {
        let since_open = self.opened_at.elapsed();
        if since_open < self.timing.warmup && !self.grabber.warms_up_per_grab() {
            let remaining = self.timing.warmup - since_open;
            log::debug!("Camera warming up ({}ms)", remaining.as_millis());
            thread::sleep(remaining);
        }

        if let Some(last) = self.last_capture {
            let since_last = last.elapsed();
            if since_last < self.timing.interval {
                thread::sleep(self.timing.interval - since_last);
            }
        }
    }

    fn save_frame(&self, image: &RgbaImage) -> SolverResult<(String, PathBuf)> {
        let name = unique_capture_name(&self.output_dir, &capture_name());
        let path = capture_path(&self.output_dir, &name)?;
        image.save(&path)?;
        Ok((name, path))
    }
}

impl ImageSource for CameraSource {
    fn capture(&mut self) -> SolverResult<Option<CaptureEvent>> {
        log::info!("Press Enter to capture, q to quit");
        if self.gestures.wait(self.timing.gesture_timeout) == Gesture::Cancel {
            log::info!("Capture cancelled");
            return Ok(None);
        }

        self.wait_until_ready();

        let image = self.grabber.grab()?;
        self.last_capture = Some(Instant::now());

        let (name, path) = self.save_frame(&image)?;
        log::info!(
            "Captured {}x{} frame to {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(Some(CaptureEvent { image, name, path }))
    }
}
