//! Documentation headers for generated files
//!
//! Code files get the header inside the language's documentation comment;
//! markdown files get YAML front-matter followed by a title heading.

use serde::Serialize;

use crate::error::Result;
use crate::languages::LanguageHeuristic;
use crate::sections::{title_case, SectionType};

/// Default `generated_on` format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata stamped at the top of every generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHeader {
    /// Composite or component name, e.g. `fibonacci_generator`
    pub name: String,
    pub section_type: SectionType,
    /// Contributing drop names, in insertion order
    pub sources: Vec<String>,
    pub generated_on: String,
}

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: String,
    composite: &'a str,
    section: SectionType,
    drops: &'a [String],
    generated_on: &'a str,
}

impl ArtifactHeader {
    pub fn new(
        name: impl Into<String>,
        section_type: SectionType,
        sources: Vec<String>,
        generated_on: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            section_type,
            sources,
            generated_on: generated_on.into(),
        }
    }

    /// `Fibonacci Generator - Implementation`
    pub fn title(&self) -> String {
        format!("{} - {}", title_case(&self.name), self.section_type.title())
    }

    /// Header as a documentation comment of the given language
    pub fn code(&self, language: &dyn LanguageHeuristic) -> String {
        let label = if self.sources.len() == 1 {
            "Generated from CodeDrop"
        } else {
            "Generated from CodeDrops"
        };

        let text = format!(
            "{}\n\n{}: {}\nSection: {}\nGenerated on: {}",
            self.title(),
            label,
            self.sources.join(", "),
            self.section_type,
            self.generated_on
        );

        language.doc_block(&text)
    }

    /// Header as markdown front-matter plus a level-1 title
    pub fn markdown(&self) -> Result<String> {
        let front_matter = FrontMatter {
            title: self.title(),
            composite: &self.name,
            section: self.section_type,
            drops: &self.sources,
            generated_on: &self.generated_on,
        };
        let yaml = serde_yaml::to_string(&front_matter)?;

        Ok(format!("---\n{}---\n\n# {}\n", yaml, self.title()))
    }
}
