use once_cell::sync::Lazy;
use regex::Regex;

use super::{span_until, LanguageHeuristic};

pub struct PythonHeuristic;

static PYTHON_SIGNALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:def\s+\w+\s*\(|class\s+\w+\s*[(:]|import\s+[\w.]+|from\s+[\w.]+\s+import\s|assert\s[^;\n]*$)")
        .unwrap()
});

static PYTHON_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:import\s+[\w.]+(?:\s+as\s+\w+)?(?:\s*,\s*[\w.]+(?:\s+as\s+\w+)?)*|from\s+[\w.]+\s+import\s+.+)\s*$")
        .unwrap()
});

/// `from x import (` with the closing parenthesis on a later line
static PYTHON_IMPORT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+[\w.]+\s+import\s*\([^)]*$").unwrap());

/// An import line continued with a trailing backslash
static PYTHON_IMPORT_CONTINUED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:import|from\s+[\w.]+\s+import)\s.*\\\s*$").unwrap());

impl LanguageHeuristic for PythonHeuristic {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn detect(&self, code: &str) -> bool {
        PYTHON_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        PYTHON_IMPORT.is_match(line)
    }

    fn import_span(&self, lines: &[&str]) -> Option<usize> {
        let first = *lines.first()?;
        if PYTHON_IMPORT_OPEN.is_match(first) {
            return span_until(lines, |line| line.contains(')'));
        }
        if PYTHON_IMPORT_CONTINUED.is_match(first) {
            return span_until(lines, |line| !line.trim_end().ends_with('\\'));
        }
        self.is_import(first).then_some(1)
    }

    fn line_comment(&self) -> &'static str {
        "#"
    }

    fn doc_block(&self, text: &str) -> String {
        format!("\"\"\"\n{}\n\"\"\"\n", text)
    }

    fn completion_marker(&self) -> String {
        "print(\"All composite tests passed!\")".to_string()
    }
}
