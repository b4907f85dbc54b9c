use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// File written by `select-camera`.
pub const CAMERA_CONFIG_FILE: &str = "camera_config.txt";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Timestamp-derived capture name: `leetcode_YYYYMMDD_HHMMSS`.
pub fn capture_name() -> String {
    format!("leetcode_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Appends `_2`, `_3`, ... to `base` until `<output_dir>/<name>.png` is free,
/// so captures within the same second keep separate outputs.
pub fn unique_capture_name(output_dir: &Path, base: &str) -> String {
    let mut name = base.to_string();
    let mut n = 1;
    while output_dir.join(format!("{}.png", name)).exists() {
        n += 1;
        name = format!("{}_{}", base, n);
    }
    name
}

/// Returns `<output_dir>/<name>.png`, creating the directory if needed.
pub fn capture_path(output_dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    Ok(output_dir.join(format!("{}.png", name)))
}

/// Writes `CAMERA_ID=<n>` to the camera config file.
pub fn write_camera_config(path: &Path, camera_id: u32) -> std::io::Result<()> {
    fs::write(path, format!("CAMERA_ID={}\n", camera_id))
}

/// Reads the camera id saved by `select-camera`, if any.
pub fn read_camera_config(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("CAMERA_ID="))
        .find_map(|value| value.trim().parse().ok())
}
