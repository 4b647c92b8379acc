pub mod cpp;
pub mod java;
pub mod javascript;
pub mod plain;
pub mod python;
pub mod rust;

use std::sync::Arc;

/// Lightweight, text-only knowledge about one language: how to recognize a
/// code body written in it, which lines include other modules, and how to
/// write comments in it.
pub trait LanguageHeuristic: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Whether the code body shows this language's signals
    fn detect(&self, code: &str) -> bool;

    /// Whether a line is a top-level module-inclusion declaration.
    /// Indented lines never are.
    fn is_import(&self, _line: &str) -> bool {
        false
    }

    /// Number of lines taken by the import statement starting at
    /// `lines[0]`, `None` when no import starts there. Statements that span
    /// several lines (parenthesized, braced or continued) count whole; one
    /// left unclosed is not an import.
    fn import_span(&self, lines: &[&str]) -> Option<usize> {
        let first = lines.first()?;
        self.is_import(first).then_some(1)
    }

    fn line_comment(&self) -> &'static str {
        "//"
    }

    /// Wraps header text in the language's documentation comment
    fn doc_block(&self, text: &str) -> String {
        let mut out = String::from("/**\n");
        for line in text.lines() {
            if line.is_empty() {
                out.push_str(" *\n");
            } else {
                out.push_str(" * ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(" */\n");
        out
    }

    /// Comment line introducing one drop's code in a composite
    fn sub_heading(&self, drop_name: &str) -> String {
        format!("{} === CodeDrop: {} ===", self.line_comment(), drop_name)
    }

    /// Final statement of a composite test file, reached only when every
    /// preceding test ran.
    ///
    /// Languages that only allow declarations at the top level of a file
    /// (Java, C, C++) have no statement to put there, so the default is a
    /// comment line.
    fn completion_marker(&self) -> String {
        format!("{} All composite tests passed", self.line_comment())
    }
}

/// Span of a multi-line statement opened on `lines[0]` and closed by the
/// first following line for which `closes` holds
pub(crate) fn span_until(lines: &[&str], closes: impl Fn(&str) -> bool) -> Option<usize> {
    lines
        .iter()
        .skip(1)
        .position(|line| closes(line))
        .map(|i| i + 2)
}

/// Ordered heuristics; the first one whose signals match wins
pub struct LanguageRegistry {
    heuristics: Vec<Arc<dyn LanguageHeuristic>>,
    fallback: Arc<dyn LanguageHeuristic>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            heuristics: Vec::new(),
            fallback: Arc::new(plain::PlainText),
        };

        registry.register(Arc::new(java::JavaHeuristic));
        registry.register(Arc::new(javascript::JavaScriptHeuristic));
        registry.register(Arc::new(cpp::CppHeuristic));
        registry.register(Arc::new(cpp::CHeuristic));
        registry.register(Arc::new(python::PythonHeuristic));
        registry.register(Arc::new(rust::RustHeuristic));

        registry
    }

    /// Appends a heuristic after the registered ones
    pub fn register(&mut self, heuristic: Arc<dyn LanguageHeuristic>) {
        self.heuristics.push(heuristic);
    }

    /// Language of a code body, plain text when nothing matches
    pub fn infer(&self, code: &str) -> Arc<dyn LanguageHeuristic> {
        self.heuristics
            .iter()
            .find(|h| h.detect(code))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn infer_extension(&self, code: &str) -> &'static str {
        self.infer(code).extension()
    }

    /// Heuristic by language name or file extension
    pub fn lookup(&self, key: &str) -> Option<Arc<dyn LanguageHeuristic>> {
        let key = key.trim().trim_start_matches('.').to_ascii_lowercase();
        self.get_by_name(&key).or_else(|| self.get_by_extension(&key))
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn LanguageHeuristic>> {
        self.heuristics
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|h| h.extension() == ext)
            .cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn LanguageHeuristic>> {
        self.heuristics
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|h| h.name() == name)
            .cloned()
    }

    /// Registered language names in priority order
    pub fn supported_languages(&self) -> Vec<&'static str> {
        self.heuristics.iter().map(|h| h.name()).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::java::JavaHeuristic;

    #[test]
    fn test_registry_order() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.supported_languages(),
            vec!["java", "javascript", "cpp", "c", "python", "rust"]
        );
    }

    #[test]
    fn test_infer_python() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("import os\n\ndef main():\n    pass"), "py");
        assert_eq!(registry.infer_extension("def add(a, b):\n    return a + b"), "py");
    }

    #[test]
    fn test_infer_javascript() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("function add(a, b) {\n  return a + b;\n}"), "js");
        assert_eq!(registry.infer_extension("console.log('hi');"), "js");
        assert_eq!(registry.infer_extension("import fs from 'fs';\nfs.readFileSync('x');"), "js");
    }

    #[test]
    fn test_infer_java() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("public class Main {}"), "java");
        assert_eq!(
            registry.infer_extension("import java.util.List;\nclass A { List<String> xs; }"),
            "java"
        );
    }

    #[test]
    fn test_infer_c_family() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("#include <stdio.h>\nint main() { return 0; }"), "c");
        assert_eq!(
            registry.infer_extension("#include <iostream>\nint main() { std::cout << 1; }"),
            "cpp"
        );
    }

    #[test]
    fn test_infer_rust() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("use std::fmt;\n\nfn main() {}"), "rs");
    }

    #[test]
    fn test_infer_fallback() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.infer_extension("just some words"), "txt");
        assert_eq!(registry.infer_extension(""), "txt");
    }

    #[test]
    fn test_infer_is_stable() {
        let registry = LanguageRegistry::new();
        let code = "import os\nfunction_call()\n";
        let first = registry.infer_extension(code);
        for _ in 0..10 {
            assert_eq!(registry.infer_extension(code), first);
        }
    }

    #[test]
    fn test_get_by_extension() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.get_by_extension("py").unwrap().name(), "python");
        assert_eq!(registry.get_by_extension("txt").unwrap().name(), "text");
        assert!(registry.get_by_extension("md").is_none());
    }

    #[test]
    fn test_get_by_name() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.get_by_name("rust").unwrap().extension(), "rs");
        assert!(registry.get_by_name("cobol").is_none());
    }

    #[test]
    fn test_lookup_by_name_or_extension() {
        let registry = LanguageRegistry::new();
        assert_eq!(registry.lookup("Python").unwrap().extension(), "py");
        assert_eq!(registry.lookup(".rs").unwrap().name(), "rust");
        assert_eq!(registry.lookup("js").unwrap().name(), "javascript");
        assert!(registry.lookup("cobol").is_none());
    }

    #[test]
    fn test_span_until() {
        let lines = ["use std::{", "    fmt,", "    io,", "};", "fn main() {}"];
        assert_eq!(span_until(&lines, |l| l.trim_end().ends_with(';')), Some(4));
        assert_eq!(span_until(&lines[..3], |l| l.trim_end().ends_with(';')), None);
    }

    #[test]
    fn test_default_import_span() {
        let java = JavaHeuristic;
        assert_eq!(java.import_span(&["import java.util.List;", "class A {}"]), Some(1));
        assert_eq!(java.import_span(&["class A {}"]), None);
        assert_eq!(java.import_span(&[]), None);
    }

    #[test]
    fn test_default_doc_block() {
        let registry = LanguageRegistry::new();
        let java = registry.get_by_name("java").unwrap();
        assert_eq!(java.doc_block("Title\n\nBody"), "/**\n * Title\n *\n * Body\n */\n");
    }
}
