//! Language-specific tree-sitter checkers.
//!
//! Each language module provides:
//! - Foreign-language markers used to skip snippets
//! - Factory function for creating checkers

#[cfg(feature = "tree-sitter")]
pub mod javascript;
#[cfg(feature = "tree-sitter")]
pub mod python;
#[cfg(feature = "tree-sitter")]
pub mod rust_lang;

/// Register all available language checkers.
#[cfg(feature = "tree-sitter")]
pub fn register_all() {
    javascript::register();
    python::register();
    rust_lang::register();
}
