//! Application Configuration
//!
//! Segmentation, classifier and output settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::vision::{ScanConfig, DEFAULT_INCREMENT};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Letter search settings
    pub segmentation: SegmentationSettings,
    /// Single-character classifier settings
    pub classifier: ClassifierSettings,
    /// Output settings
    pub output: OutputSettings,
}

/// Letter search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Candidate window growth step in pixels
    pub increment_px: u32,
    /// Worker threads used to process words in parallel
    pub workers: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            increment_px: DEFAULT_INCREMENT,
            workers: 4,
        }
    }
}

impl SegmentationSettings {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            increment: self.increment_px,
        }
    }
}

/// Tesseract classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Executable name or full path
    pub command: String,
    /// Language pack
    pub language: String,
    /// OCR engine mode
    pub oem: u32,
    /// Page segmentation mode (10 = single character)
    pub psm: u32,
    /// Resolution passed to the engine as `--dpi`
    pub dpi: u32,
    /// White margin added around each patch
    pub border_px: u32,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            oem: 1,
            psm: 10,
            dpi: 300,
            border_px: 8,
            timeout_ms: 5000,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Indent the JSON report
    pub pretty_json: bool,
    /// Also export glyphs whose boundary is a fallback
    pub export_fallback_glyphs: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty_json: true,
            export_fallback_glyphs: false,
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("org", "letterseg", "letterseg")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Default location of `config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
