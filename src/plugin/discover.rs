//! Plugin discovery by file name pattern.

use globset::{Glob, GlobMatcher};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::FrameworkError;

/// Scans a directory for plugin files.
#[derive(Debug, Clone)]
pub struct Discoverer {
    pattern: GlobMatcher,
    excluded: Vec<String>,
}

impl Discoverer {
    /// Create a discoverer matching file names against `pattern`, skipping
    /// any file name listed in `excluded`.
    pub fn new(pattern: &str, excluded: &[String]) -> Result<Self, FrameworkError> {
        let glob = Glob::new(pattern).map_err(|e| {
            FrameworkError::InvalidConfig(format!("invalid file pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self {
            pattern: glob.compile_matcher(),
            excluded: excluded.to_vec(),
        })
    }

    fn is_candidate(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name) && !self.excluded.iter().any(|e| e == file_name)
    }

    /// Return module identifiers (file stems) of matching files, sorted.
    ///
    /// Only direct children of `root` are considered.
    pub fn discover(&self, root: &Path) -> Result<Vec<String>, FrameworkError> {
        if !root.is_dir() {
            return Err(FrameworkError::PluginDir(root.to_path_buf()));
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| FrameworkError::Scan {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.is_candidate(&name) {
                continue;
            }
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        ids.dedup();
        tracing::debug!(root = %root.display(), found = ids.len(), "plugin discovery finished");
        Ok(ids)
    }
}
