//! Application configuration.
//!
//! Loads settings from a JSON file at startup. The loaded value is handed to
//! each component's constructor; nothing reads configuration from a global.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::ProviderKind;

/// Per-provider model settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier sent to the provider
    pub model: String,
    /// Override for the provider's API endpoint (base URL for Gemini)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Maximum tokens in the reply
    pub max_tokens: u32,
    /// Sampling temperature; omitted from the request when unset
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl ModelSettings {
    fn new(model: &str, max_tokens: u32, temperature: Option<f64>) -> Self {
        Self {
            model: model.to_string(),
            endpoint: None,
            max_tokens,
            temperature,
        }
    }
}

/// Model settings for every supported provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub openai: ModelSettings,
    pub claude: ModelSettings,
    pub gemini: ModelSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai: ModelSettings::new("gpt-4", 1000, Some(0.2)),
            claude: ModelSettings::new("claude-3-opus-20240229", 4000, None),
            gemini: ModelSettings::new("gemini-2.5-pro-exp-03-25", 8192, Some(0.4)),
        }
    }
}

impl ProviderSettings {
    pub fn get(&self, kind: ProviderKind) -> &ModelSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Claude => &self.claude,
            ProviderKind::Gemini => &self.gemini,
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Binary inverse threshold applied before OCR (gray > threshold becomes black)
    #[serde(default = "default_ocr_threshold")]
    pub ocr_threshold: u8,
    /// Camera warm-up before the first frame (milliseconds)
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,
    /// How long to wait for a capture/cancel keypress (seconds)
    #[serde(default = "default_gesture_timeout_secs")]
    pub gesture_timeout_secs: u64,
    /// Extension of the generated solution file
    #[serde(default = "default_solution_extension")]
    pub solution_extension: String,
    /// Language the solution is requested in
    #[serde(default = "default_language")]
    pub language: String,
    /// Editor command used to open the solution; `null` disables it
    #[serde(default = "default_editor")]
    pub editor: Option<String>,
    /// Explicit tesseract executable
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// HTTP timeout for provider calls; unset means wait indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub providers: ProviderSettings,
}

fn default_ocr_threshold() -> u8 {
    150
}

fn default_warmup_ms() -> u64 {
    2000
}

fn default_gesture_timeout_secs() -> u64 {
    300
}

fn default_solution_extension() -> String {
    "py".to_string()
}

fn default_language() -> String {
    "Python".to_string()
}

fn default_editor() -> Option<String> {
    Some("code".to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr_threshold: default_ocr_threshold(),
            warmup_ms: default_warmup_ms(),
            gesture_timeout_secs: default_gesture_timeout_secs(),
            solution_extension: default_solution_extension(),
            language: default_language(),
            editor: default_editor(),
            tesseract_path: None,
            request_timeout_secs: None,
            providers: ProviderSettings::default(),
        }
    }
}

/// Named capture defaults. The phone setup uses the back camera exposed as
/// device 1; a built-in webcam is device 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Profile {
    Phone,
    Webcam,
}

impl Profile {
    pub fn camera_id(self) -> u32 {
        match self {
            Profile::Phone => 1,
            Profile::Webcam => 0,
        }
    }

    pub fn output_dir(self) -> PathBuf {
        match self {
            Profile::Phone => PathBuf::from("solutions"),
            Profile::Webcam => PathBuf::from("output"),
        }
    }
}

/// Candidate config locations, most specific first.
fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = vec![crate::paths::get_exe_dir().join("config.json")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("snap-solver").join("config.json"));
    }
    candidates
}

/// Parses a config file. Missing fields take their defaults.
pub fn load_config_file(path: &Path) -> anyhow::Result<AppConfig> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Loads configuration from the first config file found, or returns defaults.
pub fn load_config(explicit: Option<&Path>) -> AppConfig {
    for path in config_candidates(explicit) {
        log::debug!("Looking for config at: {}", path.display());
        if !path.exists() {
            continue;
        }

        match load_config_file(&path) {
            Ok(config) => {
                log::info!("Config loaded from {}", path.display());
                return config;
            }
            Err(e) => {
                log::warn!(
                    "Failed to load {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                return AppConfig::default();
            }
        }
    }

    if explicit.is_some() {
        log::warn!("Config file not found. Using default config.");
    } else {
        log::debug!("No config file found. Using default config.");
    }
    AppConfig::default()
}
