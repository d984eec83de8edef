//! Python syntax checker.

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;
use tree_sitter::Node;

use crate::syntax::treesitter::{Config, TreeSitterChecker};
use crate::syntax::SyntaxChecker;

lazy_static! {
    /// Markers of snippets written in something other than Python.
    ///
    /// Documentation often mixes shell sessions, JavaScript, SQL and
    /// config fragments with Python examples.
    static ref FOREIGN_MARKERS: Vec<Regex> = vec![
        // C-style line comments
        Regex::new(r"(?m)^\s*//").unwrap(),
        // JavaScript / TypeScript
        Regex::new(r"\bfunction\s*\w*\s*\(").unwrap(),
        Regex::new(r"(?m)^\s*(const|let|var)\s+\w+\s*(:\s*\w+\s*)?=").unwrap(),
        Regex::new(r"console\.log\s*\(").unwrap(),
        Regex::new(r"=>\s*\{").unwrap(),
        // C, C++, Java, C#
        Regex::new(r"#include\s*[<\x22]").unwrap(),
        Regex::new(r"\bpublic\s+(static\s+)?(class|void|int|String)\b").unwrap(),
        // Rust, Go
        Regex::new(r"(?m)^\s*(pub\s+)?fn\s+\w+").unwrap(),
        Regex::new(r"\blet\s+mut\b").unwrap(),
        Regex::new(r"(?m)^\s*func\s+\w+\s*\(").unwrap(),
        Regex::new(r"(?m)^\s*package\s+\w+\s*;?\s*$").unwrap(),
        // Shell sessions and package managers
        Regex::new(r"(?m)^\s*\$\s+\S").unwrap(),
        Regex::new(r"(?m)^\s*(pip|pip3|npm|yarn|cargo|git|docker|curl|brew|apt|sudo)\s").unwrap(),
        // SQL
        Regex::new(r"(?i)\b(SELECT\s+.+\s+FROM|INSERT\s+INTO|CREATE\s+TABLE)\b").unwrap(),
        // Markup
        Regex::new(r"(?m)^\s*<(!DOCTYPE|html|div|span|\?xml)").unwrap(),
    ];

    /// Decimal literal with a leading zero, e.g. `0777`.
    static ref LEADING_ZERO: Regex = Regex::new(r"^0[0-9_]*[1-9][0-9_]*[lL]?$").unwrap();
}

/// Reject constructs the grammar tolerates but Python 3 does not.
///
/// tree-sitter-python keeps Python 2 rules (print and exec statements, long
/// and octal literals) and recovers from a missing block body by ending the
/// block at the newline. None of these leave ERROR nodes behind.
fn validate(root: Node<'_>, source: &str) -> Option<String> {
    find_problem(root, source).or_else(|| stray_backtick(root, source))
}

fn find_problem(node: Node<'_>, source: &str) -> Option<String> {
    if let Some(problem) = check_node(node, source) {
        return Some(problem);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(problem) = find_problem(child, source) {
            return Some(problem);
        }
    }
    None
}

fn check_node(node: Node<'_>, source: &str) -> Option<String> {
    let line = node.start_position().row + 1;
    match node.kind() {
        "print_statement" if !is_parenthesized_call(node) => Some(format!(
            "line {}: Python 2 print statement, call print() instead",
            line
        )),
        "exec_statement" => Some(format!(
            "line {}: Python 2 exec statement, call exec() instead",
            line
        )),
        "integer" => check_integer(node.utf8_text(source.as_bytes()).unwrap_or(""), line),
        "block" => check_block(node),
        "parameters" | "lambda_parameters" => check_parameters(node),
        _ => None,
    }
}

/// `print(...)` may come back as a print statement over a single
/// parenthesized argument, which is also a valid Python 3 call.
fn is_parenthesized_call(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let mut args = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment");
    match (args.next(), args.next()) {
        (Some(only), None) => matches!(
            only.kind(),
            "parenthesized_expression" | "tuple" | "generator_expression"
        ),
        _ => false,
    }
}

fn check_integer(text: &str, line: usize) -> Option<String> {
    if LEADING_ZERO.is_match(text) {
        Some(format!(
            "line {}: leading zeros in decimal integer literals are not permitted",
            line
        ))
    } else if text.ends_with(['l', 'L']) {
        Some(format!("line {}: Python 2 long integer suffix", line))
    } else {
        None
    }
}

/// A block must hold at least one statement, indented past its header
/// when it starts on a later line.
fn check_block(block: Node<'_>) -> Option<String> {
    let header = block.parent()?;
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");

    match first {
        None => Some(format!(
            "line {}: expected an indented block",
            header.start_position().row + 1
        )),
        Some(statement) => {
            let (head, body) = (header.start_position(), statement.start_position());
            if body.row > head.row && body.column <= head.column {
                Some(format!("line {}: expected an indented block", body.row + 1))
            } else {
                None
            }
        }
    }
}

/// Plain parameters may not follow parameters with defaults, up to the
/// first `*`, `*args` or `**kwargs`.
fn check_parameters(params: Node<'_>) -> Option<String> {
    let mut seen_default = false;
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "default_parameter" | "typed_default_parameter" => seen_default = true,
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
            "typed_parameter" if is_splat(param) => break,
            "identifier" | "typed_parameter" | "tuple_pattern" if seen_default => {
                return Some(format!(
                    "line {}: non-default argument follows default argument",
                    param.start_position().row + 1
                ));
            }
            _ => {}
        }
    }
    None
}

fn is_splat(param: Node<'_>) -> bool {
    param.named_child(0).map_or(false, |inner| {
        matches!(inner.kind(), "list_splat_pattern" | "dictionary_splat_pattern")
    })
}

/// Backticks only appear inside strings and comments in Python 3.
fn stray_backtick(root: Node<'_>, source: &str) -> Option<String> {
    let mut literals = Vec::new();
    collect_literals(root, &mut literals);
    source
        .match_indices('`')
        .map(|(at, _)| at)
        .find(|at| !literals.iter().any(|range| range.contains(at)))
        .map(|at| {
            format!(
                "line {}: backticks are not valid syntax, call repr() instead",
                source[..at].matches('\n').count() + 1
            )
        })
}

fn collect_literals(node: Node<'_>, out: &mut Vec<Range<usize>>) {
    if matches!(node.kind(), "string" | "comment") {
        out.push(node.byte_range());
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_literals(child, out);
    }
}

/// Create a new Python checker.
pub fn new_checker() -> Box<dyn SyntaxChecker> {
    Box::new(TreeSitterChecker::new(Config {
        language: tree_sitter_python::LANGUAGE.into(),
        language_name: "python",
        foreign_markers: FOREIGN_MARKERS.as_slice(),
        validate: Some(validate),
    }))
}

/// Register the Python checker.
pub fn register() {
    crate::syntax::register("python", new_checker);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_function() {
        let checker = new_checker();
        let verdict = checker.check("def f():\n  return 1");
        assert!(verdict.valid, "unexpected error: {:?}", verdict.error);
        assert!(verdict.error.is_none());
    }

    #[test]
    fn test_malformed_function() {
        let checker = new_checker();
        let verdict = checker.check("def f(:\n  pass");
        assert!(!verdict.valid);
        let error = verdict.error.unwrap();
        assert!(!error.is_empty());
        assert!(error.starts_with("line "), "got {}", error);
    }

    #[test]
    fn test_fenced_and_indented_snippet() {
        let checker = new_checker();
        let text = "Usage:\n```python\n    import os\n    for p in os.listdir('.'):\n        print(p)\n```";
        assert!(checker.check(text).valid);
    }

    #[test]
    fn test_error_line_number() {
        let checker = new_checker();
        let verdict = checker.check("x = 1\ny = 2\nif x\n    pass");
        assert!(!verdict.valid);
        assert!(verdict.error.unwrap().contains("line 3"));
    }

    fn assert_invalid(source: &str, needle: &str) {
        let verdict = new_checker().check(source);
        assert!(!verdict.valid, "accepted {:?}", source);
        let error = verdict.error.unwrap();
        assert!(error.starts_with("line "), "got {}", error);
        assert!(error.contains(needle), "{:?}: got {}", source, error);
    }

    fn assert_valid(source: &str) {
        let verdict = new_checker().check(source);
        assert!(verdict.valid, "{:?}: unexpected error {:?}", source, verdict.error);
    }

    #[test]
    fn test_unindented_block_body() {
        assert_invalid("def f():\nreturn 1", "indented block");
        assert_invalid("if x:\npass", "indented block");
        assert_invalid("class A:\n    def m(self):\n    return 1", "indented block");
        assert_valid("if x: pass");
        assert_valid("def f():\n    # note\n    return 1");
        assert_valid("class A:\n    def m(self):\n        return 1\n\nx = A()");
    }

    #[test]
    fn test_python2_statements() {
        assert_invalid("print \"hello world\"", "print statement");
        assert_invalid("import os\nprint os.getcwd()", "line 2: Python 2 print");
        assert_invalid("exec \"x = 1\"", "exec statement");
        assert_valid("print(\"hello world\")");
        assert_valid("print(\"a\", 1)\nprint()");
        assert_valid("exec(\"x = 1\")");
    }

    #[test]
    fn test_backticks() {
        assert_invalid("x = `y`", "backticks");
        assert_valid("s = '`y`'");
        assert_valid("# run `make`\nx = 1");
    }

    #[test]
    fn test_integer_literals() {
        assert_invalid("x = 0777", "leading zeros");
        assert_invalid("x = 10L", "long integer");
        assert_valid("x = 0\ny = 00\nz = 0o777\nw = 0x1F\nv = 1_000");
    }

    #[test]
    fn test_parameter_order() {
        assert_invalid("def f(a=1, b):\n    return a", "non-default argument");
        assert_invalid("g = lambda a=1, b: a", "non-default argument");
        assert_valid("def f(a, b=1, *args, c, d=2, **kw):\n    return a");
        assert_valid("def f(a=1, *, b):\n    return b");
        assert_valid("def f(a: int = 1, *rest: str):\n    return a");
    }

    #[test]
    fn test_foreign_markers() {
        let checker = new_checker();
        assert!(checker.is_foreign("const answer = 42;\nconsole.log(answer);"));
        assert!(checker.is_foreign("$ pip install requests"));
        assert!(checker.is_foreign("SELECT id FROM users WHERE active = 1"));
        assert!(checker.is_foreign("fn main() {\n    println!(\"hi\");\n}"));
        assert!(!checker.is_foreign("def f():\n    return {'a': 1}"));
        assert!(!checker.is_foreign("# comment\nimport json"));
    }
}
