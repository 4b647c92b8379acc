use super::LanguageHeuristic;

/// Fallback when no language signal matches
pub struct PlainText;

impl LanguageHeuristic for PlainText {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn detect(&self, _code: &str) -> bool {
        true
    }

    fn doc_block(&self, text: &str) -> String {
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    "//\n".to_string()
                } else {
                    format!("// {}\n", line)
                }
            })
            .collect()
    }
}
