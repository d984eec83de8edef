//! Tree-sitter based syntax checker.
//!
//! Tree-sitter always produces a tree; malformed input shows up as ERROR or
//! MISSING nodes. The first such node (in document order) is reported.

use regex::Regex;
use tree_sitter::{Language, Node, Parser as TsParser, Tree};

use super::{prepare_source, SyntaxChecker, SyntaxVerdict};

/// Longest excerpt quoted in a diagnostic.
const MAX_EXCERPT: usize = 40;

/// Language-specific pass over an error-free tree.
///
/// Returns a "line N: ..." diagnostic for constructs the grammar accepts but
/// the language rejects.
pub type Validator = fn(Node<'_>, &str) -> Option<String>;

/// Configuration for a tree-sitter language checker.
#[derive(Clone)]
pub struct Config {
    /// The tree-sitter language
    pub language: Language,
    /// Language name (e.g., "python", "rust")
    pub language_name: &'static str,
    /// Patterns whose presence suggests the text is some other language
    pub foreign_markers: &'static [Regex],
    /// Extra checks run when the tree has no ERROR or MISSING nodes
    pub validate: Option<Validator>,
}

/// Tree-sitter based checker.
pub struct TreeSitterChecker {
    config: Config,
}

impl TreeSitterChecker {
    /// Create a new tree-sitter checker with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Parse source code and return the tree.
    fn parse(&self, source: &str) -> anyhow::Result<Tree> {
        let mut parser = TsParser::new();
        parser.set_language(&self.config.language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse source"))
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn describe(node: Node, source: &str) -> String {
    let line = node.start_position().row + 1;
    if node.is_missing() {
        return format!("line {}: missing {:?}", line, node.kind());
    }

    let text = node.utf8_text(source.as_bytes()).unwrap_or("").trim();
    let excerpt: String = text
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(MAX_EXCERPT)
        .collect();
    if excerpt.is_empty() {
        format!("line {}: invalid syntax", line)
    } else {
        format!("line {}: invalid syntax near {:?}", line, excerpt)
    }
}

impl SyntaxChecker for TreeSitterChecker {
    fn language(&self) -> &str {
        self.config.language_name
    }

    fn is_foreign(&self, text: &str) -> bool {
        self.config.foreign_markers.iter().any(|re| re.is_match(text))
    }

    fn check(&self, text: &str) -> SyntaxVerdict {
        let source = prepare_source(text);
        if source.trim().is_empty() {
            return SyntaxVerdict::invalid("line 1: empty snippet");
        }

        let tree = match self.parse(&source) {
            Ok(tree) => tree,
            Err(e) => return SyntaxVerdict::invalid(format!("parser failure: {}", e)),
        };

        let root = tree.root_node();
        if !root.has_error() {
            return match self.config.validate.and_then(|validate| validate(root, &source)) {
                Some(problem) => SyntaxVerdict::invalid(problem),
                None => SyntaxVerdict::valid(),
            };
        }
        match first_error(root) {
            Some(node) => SyntaxVerdict::invalid(describe(node, &source)),
            None => SyntaxVerdict::invalid("line 1: invalid syntax"),
        }
    }
}
