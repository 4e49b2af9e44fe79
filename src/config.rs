use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Language;
use crate::parser::ParserOptions;

/// Upload ceiling for a single PDF.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistConfig {
    pub id: String,
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub parser: ParserOptions,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_file_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_file_bytes: DEFAULT_MAX_FILE_BYTES }
    }
}

fn default_input() -> String {
    "./input/**/*.pdf".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_languages() -> Vec<Language> {
    vec![Language::En, Language::Ar]
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate a YAML config file.
pub fn load_config(path: &Path) -> Result<ChecklistConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<ChecklistConfig, ConfigError> {
    let cfg: ChecklistConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if cfg.id.trim().is_empty() {
        return Err(ConfigError::Invalid("missing id".into()));
    }
    if cfg.languages.is_empty() {
        return Err(ConfigError::Invalid("languages must name at least one of en, ar".into()));
    }
    if !(cfg.parser.line_tolerance > 0.0) {
        return Err(ConfigError::Invalid(format!(
            "parser.line_tolerance must be positive, got {}",
            cfg.parser.line_tolerance
        )));
    }
    if cfg.parser.fallback_item_cap == 0 {
        return Err(ConfigError::Invalid("parser.fallback_item_cap must be at least 1".into()));
    }
    if cfg.limits.max_file_bytes == 0 {
        return Err(ConfigError::Invalid("limits.max_file_bytes must be at least 1".into()));
    }

    Ok(cfg)
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("Invalid file extension. Only .pdf files are supported: {0}")]
    NotPdf(String),
    #[error("File size {size} exceeds the maximum limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },
}

/// Check extension and size before reading a PDF from disk.
pub fn validate_input_file(path: &Path, limits: &Limits) -> Result<(), InputError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(InputError::NotPdf(path.display().to_string()));
    }
    let meta = std::fs::metadata(path).map_err(|_| InputError::FileNotFound(path.display().to_string()))?;
    if meta.len() > limits.max_file_bytes {
        return Err(InputError::TooLarge { size: meta.len(), max: limits.max_file_bytes });
    }
    Ok(())
}
