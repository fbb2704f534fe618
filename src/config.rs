//! Engine configuration.
//!
//! Loads settings from config.json at startup. Provides Tesseract location
//! overrides, OCR language and timeout, and batch worker count.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Complete engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Explicit path to the tesseract executable (searched for if unset)
    #[serde(default)]
    pub tesseract_path: Option<String>,
    /// Directory holding `<lang>.traineddata` (searched for if unset)
    #[serde(default)]
    pub tessdata_dir: Option<String>,
    /// Tesseract language spec, e.g. "eng" or "eng+fra"
    #[serde(default = "default_language")]
    pub language: String,
    /// Tesseract page segmentation mode (3 = fully automatic)
    #[serde(default = "default_page_segmentation_mode")]
    pub page_segmentation_mode: u8,
    /// Upper bound on a single OCR call (milliseconds)
    #[serde(default = "default_ocr_timeout_ms")]
    pub ocr_timeout_ms: u64,
    /// Worker threads used by `batch`
    #[serde(default = "default_batch_workers")]
    pub batch_workers: usize,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_page_segmentation_mode() -> u8 {
    3
}

fn default_ocr_timeout_ms() -> u64 {
    5000
}

fn default_batch_workers() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: default_language(),
            page_segmentation_mode: default_page_segmentation_mode(),
            ocr_timeout_ms: default_ocr_timeout_ms(),
            batch_workers: default_batch_workers(),
        }
    }
}

/// Default location: config.json next to the executable.
fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf())
}

/// Loads configuration from `path` (or the default location), falling back
/// to defaults when the file is missing or unreadable.
pub fn load_config(path: Option<&Path>) -> EngineConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read {}: {}. Using defaults.",
                    config_path.display(),
                    e
                ));
            }
        }
    } else {
        crate::log("Config file not found. Using default config.");
    }

    EngineConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(path: Option<&Path>) {
    let _ = CONFIG.set(load_config(path));
}

/// Returns the global configuration, or defaults if `init_config` was never called.
pub fn get_config() -> &'static EngineConfig {
    CONFIG.get_or_init(EngineConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "ocr_timeout_ms": 2500, "language": "eng+deu" }"#).unwrap();

        assert_eq!(config.ocr_timeout_ms, 2500);
        assert_eq!(config.language, "eng+deu");
        assert_eq!(config.page_segmentation_mode, 3);
        assert_eq!(config.batch_workers, 4);
        assert!(config.tesseract_path.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "tesseract_path": "/opt/tess/bin/tesseract" }"#).unwrap();

        let config = load_config(Some(&path));
        assert_eq!(
            config.tesseract_path.as_deref(),
            Some("/opt/tess/bin/tesseract")
        );
    }

    #[test]
    fn test_load_config_invalid_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config(Some(&path)), EngineConfig::default());
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.json")));
        assert_eq!(config, EngineConfig::default());
    }
}
