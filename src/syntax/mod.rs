//! Syntax checking of extracted code snippets.
//!
//! This module provides:
//! - `SyntaxChecker` trait: parse a snippet under one language's grammar
//! - A registry of checker factories keyed by language name
//! - Tree-sitter implementations for Python, Rust and JavaScript

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

#[cfg(feature = "tree-sitter")]
pub mod treesitter;

#[cfg(feature = "tree-sitter")]
pub mod languages;

/// Result of checking one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxVerdict {
    pub valid: bool,
    /// `line N: <diagnostic>` for invalid snippets.
    pub error: Option<String>,
}

impl SyntaxVerdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Checks snippets against one language's syntax.
pub trait SyntaxChecker: Send + Sync {
    /// Language name (e.g., "python").
    fn language(&self) -> &str;

    /// Best-effort guess that `text` is written in some other language.
    ///
    /// Callers skip such snippets instead of reporting them as invalid.
    /// False positives and negatives are expected.
    fn is_foreign(&self, text: &str) -> bool;

    /// Parse `text`. Never panics on malformed input.
    fn check(&self, text: &str) -> SyntaxVerdict;
}

/// Factory function type for creating checker instances.
pub type CheckerFactory = fn() -> Box<dyn SyntaxChecker>;

/// Global checker registry mapping language names to factories.
static REGISTRY: Lazy<RwLock<HashMap<String, CheckerFactory>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a checker factory for a language.
pub fn register(language: &str, factory: CheckerFactory) {
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.insert(language.to_string(), factory);
}

/// Get a checker for the given language.
/// Returns None if no checker is registered for it.
pub fn for_language(language: &str) -> Option<Box<dyn SyntaxChecker>> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.get(language).map(|factory| factory())
}

/// Return all registered language names, sorted.
pub fn supported_languages() -> Vec<String> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    let mut languages: Vec<String> = registry.keys().cloned().collect();
    languages.sort();
    languages
}

/// Initialize the registry with all available checkers.
/// Call this once at startup before looking up checkers.
#[cfg(feature = "tree-sitter")]
pub fn init() {
    languages::register_all();
}

/// Initialize (no-op when tree-sitter is disabled).
#[cfg(not(feature = "tree-sitter"))]
pub fn init() {}

/// Normalize snippet text before parsing.
///
/// Keeps only the contents of fenced markdown blocks when fences are
/// present, then strips indentation common to all non-blank lines.
pub fn prepare_source(text: &str) -> String {
    let body = if text.contains("```") {
        strip_fences(text)
    } else {
        text.to_string()
    };
    dedent(&body)
}

fn strip_fences(text: &str) -> String {
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    let mut in_fence = false;
    let mut saw_block = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            if in_fence {
                saw_block = true;
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            inside.push(line);
        } else {
            outside.push(line);
        }
    }

    // An unterminated fence still counts as code
    if saw_block || in_fence {
        inside.join("\n")
    } else {
        outside.join("\n")
    }
}

fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
