use once_cell::sync::Lazy;
use regex::Regex;

use super::{span_until, LanguageHeuristic};

pub struct RustHeuristic;

static RUST_SIGNALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([\w:]+\))?\s+)?(?:async\s+)?fn\s+\w+|^use\s+[\w:]+|\blet\s+mut\s").unwrap()
});

static RUST_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:pub\s+)?(?:use\s+[\w:{}, *]+|extern\s+crate\s+\w+(?:\s+as\s+\w+)?)\s*;\s*$").unwrap());

/// `use a::{` with the closing `};` on a later line
static RUST_USE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:pub(?:\([\w:]+\))?\s+)?use\s+[\w:]*\{[^;]*$").unwrap());

impl LanguageHeuristic for RustHeuristic {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }

    fn detect(&self, code: &str) -> bool {
        RUST_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        RUST_IMPORT.is_match(line)
    }

    fn import_span(&self, lines: &[&str]) -> Option<usize> {
        let first = *lines.first()?;
        if RUST_USE_OPEN.is_match(first) {
            return span_until(lines, |line| line.trim_end().ends_with(';'));
        }
        self.is_import(first).then_some(1)
    }

    fn doc_block(&self, text: &str) -> String {
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    "//!\n".to_string()
                } else {
                    format!("//! {}\n", line)
                }
            })
            .collect()
    }

    /// Rust has no top-level statements, so the marker is a test of its own
    /// that reports alongside the composite's other tests
    fn completion_marker(&self) -> String {
        "#[test]\nfn all_composite_tests_passed() {\n    println!(\"All composite tests passed!\");\n}".to_string()
    }
}
