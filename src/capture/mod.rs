//! Image acquisition.
//!
//! This module provides:
//! - Image sources (`FileSource`, `CameraSource`) behind the `ImageSource` trait
//! - Camera devices (`UsbCamera`, `IpCamera`)
//! - Stdin capture/cancel gestures
//! - HEIC conversion and interactive camera selection

pub mod convert;
pub mod device;
pub mod gesture;
pub mod probe;
pub mod source;

pub use device::{CameraType, DEFAULT_CAMERA_URL, open_camera};
pub use gesture::StdinGestures;
pub use source::{CameraSource, CameraTiming, FileSource};

use image::RgbaImage;
use std::path::PathBuf;

use crate::error::SolverResult;

/// One acquired image.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub image: RgbaImage,
    /// Base name for every file derived from this capture
    pub name: String,
    /// Where the image lives on disk
    pub path: PathBuf,
}

pub trait ImageSource {
    /// Returns the next image, or `None` when the user cancelled or the source
    /// is exhausted.
    fn capture(&mut self) -> SolverResult<Option<CaptureEvent>>;
}
