//! Detector configuration.
//!
//! Loaded from `config.json` next to the executable, or from an explicit
//! path given on the command line. Every field has a default so a partial
//! file (or no file at all) works.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Complete detector configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Tesseract executable. Discovered automatically when unset.
    pub tesseract_path: Option<PathBuf>,
    /// Passed to Tesseract as `--tessdata-dir` when set
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language (`-l`)
    pub language: String,
    /// Tesseract page segmentation mode (`--psm`). Tesseract's own default when unset.
    pub page_segmentation_mode: Option<u8>,
    /// Button captions to look for, compared case-insensitively
    pub button_labels: Vec<String>,
    /// Recognized words shorter than this are ignored
    pub min_text_len: usize,
    /// Number of OCR attempts before giving up
    pub max_attempts: u32,
    /// Delay between failed attempts (milliseconds)
    pub retry_delay_ms: u64,
    /// Delay before the first capture (milliseconds)
    pub settle_delay_ms: u64,
    /// Bits kept per channel when posterizing
    pub posterize_bits: u8,
    /// Contrast level, -255 to 255. 100 roughly doubles contrast.
    pub contrast_level: f32,
    /// Grab a fresh frame before each retry instead of re-reading the first one
    pub recapture_on_retry: bool,
}

fn default_button_labels() -> Vec<String> {
    vec!["drop".to_string(), "rehit".to_string()]
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: "eng".to_string(),
            page_segmentation_mode: None,
            button_labels: default_button_labels(),
            min_text_len: 2,
            max_attempts: 3,
            retry_delay_ms: 100,
            settle_delay_ms: 500,
            posterize_bits: 2,
            contrast_level: 100.0,
            recapture_on_retry: false,
        }
    }
}

impl DetectorConfig {
    /// Parses a config from JSON text and validates it.
    pub fn from_json(contents: &str) -> Result<Self> {
        let mut config: DetectorConfig = serde_json::from_str(contents)?;
        config.button_labels = config
            .button_labels
            .iter()
            .map(|label| label.trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if !(1..=8).contains(&self.posterize_bits) {
            bail!("posterize_bits must be between 1 and 8, got {}", self.posterize_bits);
        }
        if !(self.contrast_level > -255.0 && self.contrast_level < 259.0) {
            bail!(
                "contrast_level must be between -255 and 259 (exclusive), got {}",
                self.contrast_level
            );
        }
        if self.button_labels.is_empty() {
            bail!("button_labels must name at least one button");
        }
        Ok(())
    }
}

/// Loads configuration.
///
/// With an explicit path any read or parse failure is an error. Without one,
/// `config.json` next to the executable is tried and defaults are used when
/// it is missing or broken.
pub fn load_config(explicit: Option<&Path>) -> Result<DetectorConfig> {
    match explicit {
        Some(path) => load_config_from(path, false),
        None => load_config_from(&paths::get_default_config_path(), true),
    }
}

/// Loads configuration from `path`.
///
/// When `soft` is set, a missing, unreadable or unparsable file yields the
/// defaults instead of an error.
pub fn load_config_from(path: &Path, soft: bool) -> Result<DetectorConfig> {
    log::debug!("Looking for config at: {}", path.display());

    if soft && !path.exists() {
        log::debug!("{} not found. Using default config.", path.display());
        return Ok(DetectorConfig::default());
    }

    let loaded = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))
        .and_then(|contents| {
            DetectorConfig::from_json(&contents)
                .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))
        });

    match loaded {
        Ok(config) => {
            log::debug!("Config loaded from {}", path.display());
            Ok(config)
        }
        Err(e) if soft => {
            log::warn!("{:#}. Using defaults.", e);
            Ok(DetectorConfig::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = DetectorConfig::from_json("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.button_labels, vec!["drop", "rehit"]);
    }

    #[test]
    fn test_partial_config_overrides_only_given_fields() {
        let config = DetectorConfig::from_json(
            r#"{ "max_attempts": 5, "button_labels": [" Mulligan ", "DROP"] }"#,
        )
        .unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.button_labels, vec!["mulligan", "drop"]);
        assert_eq!(config.retry_delay_ms, 100);
        assert_eq!(config.language, "eng");
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(DetectorConfig::from_json(r#"{ "max_attempts": 0 }"#).is_err());
        assert!(DetectorConfig::from_json(r#"{ "posterize_bits": 9 }"#).is_err());
        assert!(DetectorConfig::from_json(r#"{ "contrast_level": 259.0 }"#).is_err());
        assert!(DetectorConfig::from_json(r#"{ "button_labels": ["  "] }"#).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tesseract_path": "/opt/tess/bin/tesseract" }}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(
            config.tesseract_path,
            Some(PathBuf::from("/opt/tess/bin/tesseract"))
        );
    }

    #[test]
    fn test_soft_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json"), true).unwrap();
        assert_eq!(config, DetectorConfig::default());
    }

    #[test]
    fn test_soft_load_broken_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_attempts": "#).unwrap();
        assert_eq!(load_config_from(&path, true).unwrap(), DetectorConfig::default());

        fs::write(&path, r#"{ "max_attempts": 0 }"#).unwrap();
        assert_eq!(
            load_config_from(&path, true).unwrap(),
            DetectorConfig::default(),
            "Invalid values fall back too"
        );
    }

    #[test]
    fn test_soft_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "retry_delay_ms": 250 }"#).unwrap();
        assert_eq!(load_config_from(&path, true).unwrap().retry_delay_ms, 250);
    }

    #[test]
    fn test_load_explicit_path_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_config(Some(file.path())).is_err());
        assert!(load_config(Some(Path::new("/nonexistent/config.json"))).is_err());
    }
}
