//! CodeDrop extraction
//!
//! Reads documents in either dialect into [`Sections`], and writes the
//! sections of one drop back out as separate, documented files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CodeDropError, Result};
use crate::header::ArtifactHeader;
use crate::languages::LanguageRegistry;
use crate::sections::{CodeDrop, MarkupParser, SectionParser, SectionType, Sections};

/// Options for [`Extractor::save_sections`]
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Base file name; the drop name when unset
    pub base_name: Option<String>,
    /// Write each section type into its own subdirectory
    pub subdirs: bool,
    /// Language of the code sections, by name or extension. Inferred from
    /// each code body when unset.
    pub language: Option<String>,
    pub generated_on: String,
}

pub struct Extractor {
    registry: LanguageRegistry,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_registry(LanguageRegistry::new())
    }

    pub fn with_registry(registry: LanguageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Reads a file and extracts its sections. `.html`/`.htm` files always
    /// use the markup dialect; anything else is detected from content.
    pub fn extract_from_file(&self, path: &Path) -> Result<Sections> {
        let content = read_drop(path)?;

        let sections = if is_markup_file(path) {
            self.extract_from_markup(&content)
        } else {
            self.extract_from_string(&content)
        };

        report_missing_core(&path.display().to_string(), &sections);
        Ok(sections)
    }

    pub fn extract_from_markup(&self, markup: &str) -> Sections {
        MarkupParser::parse(markup)
    }

    /// Extracts sections from text in either dialect, chosen by content
    pub fn extract_from_string(&self, text: &str) -> Sections {
        if MarkupParser::detect(text) {
            tracing::debug!("Markup section elements detected, using markup dialect");
            return MarkupParser::parse(text);
        }
        SectionParser::parse(text)
    }

    /// Unwrapped implementation code of a file, empty when it has none
    pub fn extract_implementation(&self, path: &Path) -> Result<String> {
        let sections = self.extract_from_file(path)?;
        Ok(implementation_code(&sections))
    }

    /// Same as [`Extractor::extract_implementation`] for in-memory text
    pub fn extract_implementation_from_string(&self, text: &str) -> String {
        implementation_code(&self.extract_from_string(text))
    }

    /// Extracts a file into a named drop
    pub fn extract_drop(&self, path: &Path) -> Result<CodeDrop> {
        let sections = self.extract_from_file(path)?;
        Ok(CodeDrop::new(
            CodeDrop::name_from_path(path),
            sections,
            path.display().to_string(),
        ))
    }

    /// Builds a drop from in-memory text
    pub fn drop_from_string(&self, name: &str, text: &str) -> CodeDrop {
        CodeDrop::new(name, self.extract_from_string(text), "string input")
    }

    /// File extension for a code body
    pub fn guess_extension(&self, code: &str) -> &'static str {
        self.registry.infer_extension(code)
    }

    /// Writes every recognized section of a drop to
    /// `{dir}/{base}_{type}.{ext}` behind a documentation header.
    pub fn save_sections(
        &self,
        drop: &CodeDrop,
        dir: &Path,
        options: &SaveOptions,
    ) -> Result<Vec<(SectionType, PathBuf)>> {
        let base_name = options.base_name.as_deref().unwrap_or(&drop.name);
        let source_file = Path::new(&drop.origin)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| drop.origin.clone());

        let forced_language = match options.language.as_deref() {
            Some(key) => Some(self.registry.lookup(key).ok_or_else(|| {
                CodeDropError::UnknownLanguage {
                    name: key.to_string(),
                    supported: self.registry.supported_languages().join(", "),
                }
            })?),
            None => None,
        };

        let mut written = Vec::new();

        for section in &drop.sections {
            if section.section_type == SectionType::Unknown {
                continue;
            }

            let target_dir = if options.subdirs {
                dir.join(section.section_type.as_str())
            } else {
                dir.to_path_buf()
            };
            fs::create_dir_all(&target_dir)?;

            let header = ArtifactHeader::new(
                base_name,
                section.section_type,
                vec![source_file.clone()],
                options.generated_on.clone(),
            );

            let (extension, text) = if section.section_type.is_code() {
                let code = section.unwrapped();
                let language = forced_language
                    .clone()
                    .unwrap_or_else(|| self.registry.infer(code));
                let text = format!("{}\n{}\n", header.code(language.as_ref()), code);
                (language.extension(), text)
            } else {
                ("md", format!("{}\n{}\n", header.markdown()?, section.content))
            };

            let path = target_dir.join(format!("{}_{}.{}", base_name, section.section_type, extension));
            fs::write(&path, text)?;
            tracing::debug!("Wrote {} section to {}", section.section_type, path.display());

            written.push((section.section_type, path));
        }

        Ok(written)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn implementation_code(sections: &Sections) -> String {
    sections
        .get(SectionType::Implementation)
        .map(|s| s.unwrapped().to_string())
        .unwrap_or_default()
}

/// Reads a drop file. Bytes that are not valid UTF-8 are replaced rather
/// than rejected.
fn read_drop(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(CodeDropError::NotFound(path.display().to_string()));
    }

    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => {
            CodeDropError::NotFound(path.display().to_string())
        }
        _ => CodeDropError::Io(e),
    })?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

fn report_missing_core(origin: &str, sections: &Sections) {
    if sections.is_empty() {
        tracing::debug!("No CodeDrop sections found in {}", origin);
        return;
    }

    let missing = sections.missing_core();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|t| t.as_str()).collect();
        tracing::warn!("Missing sections in CodeDrop {}: {}", origin, names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DROP: &str = r#"# Requirements
- Add two numbers

# Design
Plain function.

# Implementation
Here is the code:

```python
import os

def add(a, b):
    return a + b
```

# Testing
```python
assert add(1, 2) == 3
```

# Documentation
Call `add`.
"#;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_extract_from_string_heading_dialect() {
        let extractor = Extractor::new();
        let sections = extractor.extract_from_string(DROP);
        assert_eq!(sections.len(), 5);
    }

    #[test]
    fn test_extract_from_string_empty() {
        let extractor = Extractor::new();
        assert!(extractor.extract_from_string("").is_empty());
    }

    #[test]
    fn test_extract_from_string_dispatches_markup() {
        let extractor = Extractor::new();
        let sections = extractor
            .extract_from_string("<div id=\"design\"><h2>Design</h2>Layers</div>");
        assert_eq!(sections.content(SectionType::Design), Some("Layers"));
    }

    #[test]
    fn test_extract_implementation_only_code() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "adder.md", DROP);

        let code = Extractor::new().extract_implementation(&path).unwrap();
        assert_eq!(code, "import os\n\ndef add(a, b):\n    return a + b");
    }

    #[test]
    fn test_extract_implementation_absent() {
        let extractor = Extractor::new();
        assert_eq!(extractor.extract_implementation_from_string("# Design\nd"), "");
    }

    #[test]
    fn test_extract_from_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = Extractor::new().extract_from_file(&temp_dir.path().join("missing.md"));
        assert!(matches!(result, Err(CodeDropError::NotFound(_))));

        let result = Extractor::new().extract_from_file(temp_dir.path());
        assert!(matches!(result, Err(CodeDropError::NotFound(_))));
    }

    #[test]
    fn test_extract_from_html_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            temp_dir.path(),
            "page.html",
            "<section id=\"testing\"><pre><code>assert True</code></pre></section>",
        );

        let sections = Extractor::new().extract_from_file(&path).unwrap();
        assert_eq!(sections.get(SectionType::Testing).unwrap().unwrapped(), "assert True");
    }

    #[test]
    fn test_extract_drop_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "string_utils.md", DROP);

        let drop = Extractor::new().extract_drop(&path).unwrap();
        assert_eq!(drop.name, "string_utils");
        assert_eq!(drop.origin, path.display().to_string());
    }

    #[test]
    fn test_save_sections() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = Extractor::new();
        let drop = extractor.drop_from_string("adder", DROP);

        let options = SaveOptions {
            generated_on: "2025-01-01 00:00:00".to_string(),
            ..Default::default()
        };
        let written = extractor.save_sections(&drop, temp_dir.path(), &options).unwrap();

        assert_eq!(written.len(), 5);
        let implementation = temp_dir.path().join("adder_implementation.py");
        assert!(implementation.exists());
        assert!(temp_dir.path().join("adder_requirements.md").exists());

        let text = fs::read_to_string(implementation).unwrap();
        assert!(text.starts_with("\"\"\"\nAdder - Implementation\n"));
        assert!(text.contains("def add(a, b):"));
        assert!(!text.contains("```"));
    }

    #[test]
    fn test_save_sections_subdirs_and_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = Extractor::new();
        let drop = extractor.drop_from_string("adder", DROP);

        let options = SaveOptions {
            base_name: Some("calc".to_string()),
            subdirs: true,
            ..Default::default()
        };
        extractor.save_sections(&drop, temp_dir.path(), &options).unwrap();

        assert!(temp_dir.path().join("testing/calc_testing.py").exists());
        assert!(temp_dir.path().join("design/calc_design.md").exists());
    }

    #[test]
    fn test_save_sections_forced_language() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = Extractor::new();
        let drop = extractor.drop_from_string("adder", DROP);

        let options = SaveOptions {
            language: Some("rust".to_string()),
            ..Default::default()
        };
        let written = extractor.save_sections(&drop, temp_dir.path(), &options).unwrap();

        let implementation = temp_dir.path().join("adder_implementation.rs");
        assert!(written.contains(&(SectionType::Implementation, implementation.clone())));
        assert!(fs::read_to_string(implementation).unwrap().starts_with("//! Adder - Implementation"));
    }

    #[test]
    fn test_save_sections_unknown_language() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = Extractor::new();
        let drop = extractor.drop_from_string("adder", DROP);

        let options = SaveOptions {
            language: Some("cobol".to_string()),
            ..Default::default()
        };
        let result = extractor.save_sections(&drop, temp_dir.path(), &options);

        match result {
            Err(CodeDropError::UnknownLanguage { name, supported }) => {
                assert_eq!(name, "cobol");
                assert!(supported.contains("python"));
            }
            other => panic!("expected UnknownLanguage, got {:?}", other),
        }
        assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_extract_invalid_utf8_is_lossy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.md");
        fs::write(&path, b"# Design\ncaf\xe9 layers\n").unwrap();

        let sections = Extractor::new().extract_from_file(&path).unwrap();
        assert_eq!(sections.content(SectionType::Design), Some("caf\u{FFFD} layers"));
    }

    #[test]
    fn test_guess_extension() {
        let extractor = Extractor::new();
        assert_eq!(extractor.guess_extension("def f():\n    pass"), "py");
        assert_eq!(extractor.guess_extension("nothing to see"), "txt");
    }
}
