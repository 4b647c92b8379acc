use once_cell::sync::Lazy;
use regex::Regex;

use super::{span_until, LanguageHeuristic};

pub struct JavaScriptHeuristic;

static JS_SIGNALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)function\s+\w+\s*\(|console\.log|^\s*(?:const|let|var)\s+.+=\s*require\(|^import\s.+\sfrom\s+['"]"#,
    )
    .unwrap()
});

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:import\s.+\sfrom\s+['"][^'"]+['"]|import\s+['"][^'"]+['"]|(?:const|let|var)\s+.+=\s*require\(\s*['"][^'"]+['"]\s*\));?\s*$"#,
    )
    .unwrap()
});

/// `import {` with the `} from '...'` on a later line
static JS_IMPORT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^import\s+(?:\w+\s*,\s*)?\{[^}]*$").unwrap());

static JS_IMPORT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\}\s*from\s+['"][^'"]+['"];?\s*$"#).unwrap());

impl LanguageHeuristic for JavaScriptHeuristic {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn extension(&self) -> &'static str {
        "js"
    }

    fn detect(&self, code: &str) -> bool {
        JS_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        JS_IMPORT.is_match(line)
    }

    fn import_span(&self, lines: &[&str]) -> Option<usize> {
        let first = *lines.first()?;
        if JS_IMPORT_OPEN.is_match(first) {
            return span_until(lines, |line| JS_IMPORT_CLOSE.is_match(line));
        }
        self.is_import(first).then_some(1)
    }

    fn completion_marker(&self) -> String {
        "console.log(\"All composite tests passed!\");".to_string()
    }
}
