//! Configuration schema for assistcheck.
//!
//! Every field is optional; an absent config file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FrameworkError;
use crate::syntax;

/// Config file names searched for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["assistcheck.yaml", ".assistcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for plugin manifests.
    pub plugin_dir: PathBuf,
    /// Glob matched against plugin file names.
    pub file_pattern: String,
    /// File names never treated as plugins (templates, examples).
    pub excluded_files: Vec<String>,
    /// Where the JSON and HTML reports are written.
    pub output_dir: PathBuf,
    /// Export-name prefix identifying factory candidates.
    pub factory_prefix: String,
    /// Name prefix identifying companion class candidates.
    pub class_prefix: String,
    /// Minimum `system_prompt` length in characters.
    pub min_prompt_length: usize,
    /// Text leaves must be longer than this to be considered snippets.
    pub min_snippet_length: usize,
    /// Language snippets are syntax-checked as.
    pub language: String,
    /// Additional substrings that mark a text as code.
    pub extra_code_indicators: Vec<String>,
    /// Validate plugins on the rayon pool (report order is unchanged).
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_dir: PathBuf::from("assistants"),
            file_pattern: "enhanced_*_assistant.yaml".to_string(),
            excluded_files: vec!["enhanced_template_assistant.yaml".to_string()],
            output_dir: PathBuf::from("test_reports"),
            factory_prefix: "create_enhanced_".to_string(),
            class_prefix: "Enhanced".to_string(),
            min_prompt_length: 100,
            min_snippet_length: 10,
            language: "python".to_string(),
            extra_code_indicators: Vec::new(),
            parallel: false,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, FrameworkError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FrameworkError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| FrameworkError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find a config file in `dir`, if any.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> Result<(), FrameworkError> {
    globset::Glob::new(&config.file_pattern).map_err(|e| {
        FrameworkError::InvalidConfig(format!(
            "invalid file_pattern {:?}: {}",
            config.file_pattern, e
        ))
    })?;

    if config.factory_prefix.is_empty() {
        return Err(FrameworkError::InvalidConfig(
            "factory_prefix must not be empty".to_string(),
        ));
    }

    if config.class_prefix.is_empty() {
        return Err(FrameworkError::InvalidConfig(
            "class_prefix must not be empty".to_string(),
        ));
    }

    let languages = syntax::supported_languages();
    if !languages.is_empty() && !languages.contains(&config.language) {
        return Err(FrameworkError::InvalidConfig(format!(
            "unsupported language {:?}, expected one of: {}",
            config.language,
            languages.join(", ")
        )));
    }

    Ok(())
}
