use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{SolverError, SolverResult};

/// Common install locations checked after `PATH`.
#[cfg(windows)]
const COMMON_EXECUTABLES: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

#[cfg(not(windows))]
const COMMON_EXECUTABLES: &[&str] = &[
    "/opt/homebrew/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/usr/bin/tesseract",
];

/// Common tessdata locations, used when `TESSDATA_PREFIX` is not set.
#[cfg(windows)]
const COMMON_TESSDATA: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

#[cfg(not(windows))]
const COMMON_TESSDATA: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/usr/local/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
];

/// Finds the Tesseract executable: explicit path first, then `PATH`, then
/// common install locations.
pub fn find_tesseract_executable(explicit: Option<&Path>) -> SolverResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        log::warn!(
            "Configured tesseract not found at {}, searching elsewhere",
            path.display()
        );
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            SolverError::Extraction("Tesseract not found. Please install Tesseract-OCR.".to_string())
        })
}

fn has_english(dir: &Path) -> bool {
    dir.join("eng.traineddata").exists()
}

/// Finds a tessdata directory with English data.
///
/// Returns `None` when nothing is found; tesseract then falls back to its
/// compiled-in default.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if has_english(&p) {
            return Some(p);
        }
        let p = p.join("tessdata");
        if has_english(&p) {
            return Some(p);
        }
    }

    COMMON_TESSDATA
        .iter()
        .map(PathBuf::from)
        .find(|p| has_english(p))
}
