//! Code snippet extraction from plugin value trees.
//!
//! Detection is heuristic: a text leaf counts as code when the classifier
//! says so. False positives and negatives are accepted; callers that know
//! their content can plug in a stricter classifier.

use crate::value::Value;

/// Substrings that suggest a text is source code.
pub const CODE_INDICATORS: &[&str] = &[
    "def ",
    "class ",
    "import ",
    "return ",
    "elif ",
    "else:",
    "try:",
    "except ",
    "except:",
    "lambda ",
    "print(",
    "self.",
    "__init__",
    "async def",
    "await ",
    "yield ",
    "raise ",
    "with open(",
    "if __name__",
    "```",
    "# ",
    "{",
    "}",
    "=>",
    "();",
];

/// Decides whether a text fragment looks like code.
pub trait SnippetClassifier: Send + Sync {
    fn is_code(&self, text: &str) -> bool;
}

/// Substring-based classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    indicators: Vec<String>,
}

impl KeywordClassifier {
    /// Classifier using [`CODE_INDICATORS`].
    pub fn new() -> Self {
        Self::with_indicators(CODE_INDICATORS.iter().map(|s| s.to_string()))
    }

    /// Classifier using exactly the given indicators.
    pub fn with_indicators<I: IntoIterator<Item = String>>(indicators: I) -> Self {
        Self {
            indicators: indicators.into_iter().collect(),
        }
    }

    /// Add indicators on top of the current set.
    pub fn extend<I: IntoIterator<Item = String>>(mut self, extra: I) -> Self {
        self.indicators.extend(extra);
        self
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetClassifier for KeywordClassifier {
    fn is_code(&self, text: &str) -> bool {
        self.indicators.iter().any(|i| text.contains(i.as_str()))
    }
}

/// A suspected code fragment and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Walk path, e.g. `examples.basic[0]`. Empty for a root text value.
    pub path: String,
    pub text: String,
}

/// Join a parent path and a child path segment produced by the walk.
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else if child.starts_with('[') {
        format!("{}{}", parent, child)
    } else {
        format!("{}.{}", parent, child)
    }
}

/// Walk `value` and return every text leaf longer than `min_len`
/// characters that the classifier accepts.
pub fn extract_snippets(
    value: &Value,
    classifier: &dyn SnippetClassifier,
    min_len: usize,
) -> Vec<Snippet> {
    let mut found = Vec::new();
    walk(value, "", classifier, min_len, &mut found);
    found
}

fn walk(
    value: &Value,
    path: &str,
    classifier: &dyn SnippetClassifier,
    min_len: usize,
    found: &mut Vec<Snippet>,
) {
    match value {
        Value::Text(text) => {
            if text.chars().count() > min_len && classifier.is_code(text) {
                found.push(Snippet {
                    path: path.to_string(),
                    text: text.clone(),
                });
            }
        }
        Value::Map(entries) => {
            for (key, child) in entries {
                walk(child, &join_path(path, key), classifier, min_len, found);
            }
        }
        Value::Seq(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(child, &format!("{}[{}]", path, i), classifier, min_len, found);
            }
        }
        _ => {}
    }
}
