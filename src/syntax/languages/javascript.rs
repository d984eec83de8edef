//! JavaScript syntax checker.

use lazy_static::lazy_static;
use regex::Regex;

use crate::syntax::treesitter::{Config, TreeSitterChecker};
use crate::syntax::SyntaxChecker;

lazy_static! {
    /// Markers of snippets written in something other than JavaScript.
    static ref FOREIGN_MARKERS: Vec<Regex> = vec![
        // Python
        Regex::new(r"(?m)^\s*def\s+\w+\s*\(.*\)\s*(->\s*[\w\[\], ]+)?:\s*$").unwrap(),
        Regex::new(r"(?m)^\s*from\s+\S+\s+import\s+\w+").unwrap(),
        Regex::new(r"(?m)^\s*(elif|except)\b").unwrap(),
        // Rust
        Regex::new(r"(?m)^\s*(pub\s+)?fn\s+\w+").unwrap(),
        Regex::new(r"\blet\s+mut\b").unwrap(),
        // Shell sessions
        Regex::new(r"(?m)^\s*\$\s+\S").unwrap(),
    ];
}

/// Create a new JavaScript checker.
pub fn new_checker() -> Box<dyn SyntaxChecker> {
    Box::new(TreeSitterChecker::new(Config {
        language: tree_sitter_javascript::LANGUAGE.into(),
        language_name: "javascript",
        foreign_markers: FOREIGN_MARKERS.as_slice(),
        validate: None,
    }))
}

/// Register the JavaScript checker.
pub fn register() {
    crate::syntax::register("javascript", new_checker);
}
