//! HEIC/HEIF photos are not decodable by `image`; convert them with whatever
//! external tool is installed.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub fn is_heic(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("heic") || ext.eq_ignore_ascii_case("heif"))
        .unwrap_or(false)
}

/// `<dir>/<stem>_converted.jpg`
pub fn converted_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    path.with_file_name(format!("{}_converted.jpg", stem))
}

fn run_converter(program: &str, args: &[&OsStr]) -> bool {
    match Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => true,
        Ok(status) => {
            log::debug!("{} exited with {}", program, status);
            false
        }
        Err(e) => {
            log::debug!("{} not available: {}", program, e);
            false
        }
    }
}

/// Converts HEIC/HEIF files to JPEG. Other files, and files no converter could
/// handle, come back unchanged; decoding then reports the real problem.
pub fn ensure_decodable(path: &Path) -> PathBuf {
    if !is_heic(path) {
        return path.to_path_buf();
    }

    let target = converted_path(path);
    log::info!("Converting {} to JPEG...", path.display());

    let src = path.as_os_str();
    let dst = target.as_os_str();

    if run_converter("magick", &[OsStr::new("convert"), src, dst]) {
        log::info!("Converted with ImageMagick: {}", target.display());
        return target;
    }

    if cfg!(target_os = "macos")
        && run_converter(
            "sips",
            &[
                OsStr::new("-s"),
                OsStr::new("format"),
                OsStr::new("jpeg"),
                src,
                OsStr::new("--out"),
                dst,
            ],
        )
    {
        log::info!("Converted with sips: {}", target.display());
        return target;
    }

    log::warn!(
        "Could not convert {}; install ImageMagick to read HEIC files",
        path.display()
    );
    path.to_path_buf()
}
