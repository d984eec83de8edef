//! Rust syntax checker.

use lazy_static::lazy_static;
use regex::Regex;

use crate::syntax::treesitter::{Config, TreeSitterChecker};
use crate::syntax::SyntaxChecker;

lazy_static! {
    /// Markers of snippets written in something other than Rust.
    static ref FOREIGN_MARKERS: Vec<Regex> = vec![
        // Python
        Regex::new(r"(?m)^\s*def\s+\w+\s*\(.*\)\s*(->\s*[\w\[\], ]+)?:\s*$").unwrap(),
        Regex::new(r"(?m)^\s*(from\s+\S+\s+)?import\s+\w+").unwrap(),
        Regex::new(r"(?m)^\s*class\s+\w+(\(.*\))?:\s*$").unwrap(),
        // JavaScript
        Regex::new(r"\bfunction\s*\w*\s*\(").unwrap(),
        Regex::new(r"console\.log\s*\(").unwrap(),
        // Shell sessions
        Regex::new(r"(?m)^\s*\$\s+\S").unwrap(),
    ];
}

/// Create a new Rust checker.
pub fn new_checker() -> Box<dyn SyntaxChecker> {
    Box::new(TreeSitterChecker::new(Config {
        language: tree_sitter_rust::LANGUAGE.into(),
        language_name: "rust",
        foreign_markers: FOREIGN_MARKERS.as_slice(),
        validate: None,
    }))
}

/// Register the Rust checker.
pub fn register() {
    crate::syntax::register("rust", new_checker);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_valid() {
        let checker = new_checker();
        assert!(checker.check("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}").valid);
    }

    #[test]
    fn test_rust_invalid() {
        let checker = new_checker();
        let verdict = checker.check("fn add(a: i32 -> i32 {\n    a + b\n");
        assert!(!verdict.valid);
        assert!(verdict.error.is_some());
    }

    #[test]
    fn test_rust_foreign() {
        let checker = new_checker();
        assert!(checker.is_foreign("def handler(event):\n    return event"));
        assert!(!checker.is_foreign("let x = vec![1, 2, 3];"));
    }
}
