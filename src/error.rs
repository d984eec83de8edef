//! Framework errors.
//!
//! These indicate the tool itself cannot proceed (bad configuration, missing
//! plugin directory, unwritable output). Plugin misbehavior is never reported
//! through this type; it becomes an `ERROR` test result instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("reading config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("plugin directory {0} does not exist or is not a directory")]
    PluginDir(PathBuf),

    #[error("scanning {path}: {source}")]
    Scan {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("writing report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serializing report: {0}")]
    Serialize(#[from] serde_json::Error),
}
