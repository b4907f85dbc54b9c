//! Camera devices.
//!
//! USB cameras are read through `ffmpeg` (v4l2 on Linux, avfoundation on
//! macOS), one still frame per grab. Each grab opens the device afresh, so
//! ffmpeg drops the frames of the warm-up window before keeping one. IP
//! cameras serve a snapshot over HTTP.

use image::RgbaImage;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::{SolverError, SolverResult};

pub const DEFAULT_CAMERA_URL: &str = "http://192.168.1.100:8080/shot.jpg";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CameraType {
    /// Phone or network camera serving JPEG snapshots
    Ip,
    /// Locally attached camera
    Usb,
}

/// Produces one frame per call.
pub trait FrameGrabber {
    /// Human-readable device name for logs and errors
    fn describe(&self) -> String;
    fn grab(&mut self) -> SolverResult<RgbaImage>;

    /// True when every grab already skips the device's warm-up frames.
    fn warms_up_per_grab(&self) -> bool {
        false
    }
}

/// Opens the configured camera.
pub fn open_camera(
    camera_type: CameraType,
    camera_id: u32,
    url: &str,
    warmup: Duration,
) -> SolverResult<Box<dyn FrameGrabber>> {
    match camera_type {
        CameraType::Usb => Ok(Box::new(UsbCamera::open(camera_id, warmup)?)),
        CameraType::Ip => Ok(Box::new(IpCamera::new(url)?)),
    }
}

pub struct UsbCamera {
    id: u32,
    input_format: &'static str,
    input: String,
    warmup: Duration,
}

impl UsbCamera {
    /// Checks that ffmpeg and the device are present.
    pub fn open(id: u32, warmup: Duration) -> SolverResult<Self> {
        let name = format!("usb:{}", id);

        let (input_format, input) = if cfg!(target_os = "linux") {
            let device = format!("/dev/video{}", id);
            if !Path::new(&device).exists() {
                return Err(SolverError::device(name, format!("{} does not exist", device)));
            }
            ("v4l2", device)
        } else if cfg!(target_os = "macos") {
            ("avfoundation", id.to_string())
        } else {
            return Err(SolverError::device(
                name,
                "USB capture is supported on Linux and macOS only; use --camera-type ip",
            ));
        };

        let probe = Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if !matches!(probe, Ok(status) if status.success()) {
            return Err(SolverError::device(name, "ffmpeg not found in PATH"));
        }

        log::debug!("Opened {} ({} {})", name, input_format, input);
        Ok(Self {
            id,
            input_format,
            input,
            warmup,
        })
    }

    /// ffmpeg arguments for one PNG frame on stdout. An output-side `-ss`
    /// decodes and discards everything before the warm-up mark.
    fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error", "-f", self.input_format]
            .into_iter()
            .map(String::from)
            .collect();
        args.extend(["-i".to_string(), self.input.clone()]);
        if !self.warmup.is_zero() {
            args.extend(["-ss".to_string(), format!("{:.3}", self.warmup.as_secs_f64())]);
        }
        args.extend(
            ["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"]
                .into_iter()
                .map(String::from),
        );
        args
    }
}

impl FrameGrabber for UsbCamera {
    fn describe(&self) -> String {
        format!("usb:{}", self.id)
    }

    fn grab(&mut self) -> SolverResult<RgbaImage> {
        let output = Command::new("ffmpeg")
            .args(self.ffmpeg_args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SolverError::device(self.describe(), e.to_string()))?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::device(
                self.describe(),
                format!("failed to read frame: {}", stderr.trim()),
            ));
        }

        Ok(image::load_from_memory(&output.stdout)?.to_rgba8())
    }

    fn warms_up_per_grab(&self) -> bool {
        true
    }
}

pub struct IpCamera {
    url: String,
    http: reqwest::blocking::Client,
}

impl IpCamera {
    pub fn new(url: &str) -> SolverResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SolverError::device(url, e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            http,
        })
    }
}

impl FrameGrabber for IpCamera {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn grab(&mut self) -> SolverResult<RgbaImage> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| SolverError::device(&self.url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolverError::device(&self.url, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .map_err(|e| SolverError::device(&self.url, e.to_string()))?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}
