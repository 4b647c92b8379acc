use once_cell::sync::Lazy;
use regex::Regex;

use super::LanguageHeuristic;

pub struct JavaHeuristic;

static JAVA_SIGNALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)public\s+class\s|public\s+static\s+void\s+main|^import\s+(?:static\s+)?[\w.]+(?:\.\*)?\s*;")
        .unwrap()
});

static JAVA_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+(?:static\s+)?[\w.]+(?:\.\*)?\s*;\s*$").unwrap());

impl LanguageHeuristic for JavaHeuristic {
    fn name(&self) -> &'static str {
        "java"
    }

    fn extension(&self) -> &'static str {
        "java"
    }

    fn detect(&self, code: &str) -> bool {
        JAVA_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        JAVA_IMPORT.is_match(line)
    }
}
