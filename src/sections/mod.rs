//! CodeDrop section model
//!
//! A CodeDrop is one document holding typed sections (requirements, design,
//! implementation, testing, documentation). This module defines the section
//! types, the ordered per-document section mapping and the parsed drop.

pub mod markup;
pub mod parser;

pub use markup::MarkupParser;
pub use parser::{unwrap_fences, SectionParser};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type of a CodeDrop section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Requirements,
    Design,
    Implementation,
    Testing,
    Documentation,
    Unknown,
}

impl SectionType {
    /// Default reconstruction order. Never contains `Unknown`.
    pub const CANONICAL_ORDER: [SectionType; 5] = [
        SectionType::Requirements,
        SectionType::Design,
        SectionType::Implementation,
        SectionType::Testing,
        SectionType::Documentation,
    ];

    /// Maps a heading label or markup id to a section type.
    ///
    /// Matching is case-insensitive, ignores surrounding whitespace and a
    /// trailing colon, and accepts a few historical aliases
    /// (`Specification`, `Architecture`, `Code`, `Tests`).
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().trim_end_matches(':').trim().to_lowercase();
        match normalized.as_str() {
            "requirements" | "specification" => SectionType::Requirements,
            "design" | "architecture" => SectionType::Design,
            "implementation" | "code" => SectionType::Implementation,
            "testing" | "tests" => SectionType::Testing,
            "documentation" => SectionType::Documentation,
            _ => SectionType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Requirements => "requirements",
            SectionType::Design => "design",
            SectionType::Implementation => "implementation",
            SectionType::Testing => "testing",
            SectionType::Documentation => "documentation",
            SectionType::Unknown => "unknown",
        }
    }

    /// Human-readable title ("Requirements", "Testing", ...)
    pub fn title(&self) -> &'static str {
        match self {
            SectionType::Requirements => "Requirements",
            SectionType::Design => "Design",
            SectionType::Implementation => "Implementation",
            SectionType::Testing => "Testing",
            SectionType::Documentation => "Documentation",
            SectionType::Unknown => "Unknown",
        }
    }

    /// Whether the section carries source code rather than prose
    pub fn is_code(&self) -> bool {
        matches!(self, SectionType::Implementation | SectionType::Testing)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match SectionType::from_label(s) {
            SectionType::Unknown if !s.trim().eq_ignore_ascii_case("unknown") => {
                Err(format!("unknown section type: {}", s))
            }
            section_type => Ok(section_type),
        }
    }
}

/// A contiguous, typed block of a CodeDrop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    /// Body between this marker and the next, outer blank lines trimmed
    pub content: String,
    /// Marker that opened the section (heading line or opening tag)
    pub source: String,
    /// Literal code of the fenced regions, for code sections that have any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Section {
    pub fn new(section_type: SectionType, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            section_type,
            content: content.into(),
            source: source.into(),
            code: None,
        }
    }

    /// Runnable form of the section: the unwrapped code when fenced
    /// regions were found, the raw content otherwise.
    pub fn unwrapped(&self) -> &str {
        self.code.as_deref().unwrap_or(&self.content)
    }
}

/// Ordered mapping of section type to section, at most one per type.
///
/// Inserting a type that is already present replaces its section in place,
/// so the last occurrence in a document wins but keeps the position of the
/// first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    entries: Vec<Section>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, section: Section) {
        match self
            .entries
            .iter_mut()
            .find(|s| s.section_type == section.section_type)
        {
            Some(existing) => *existing = section,
            None => self.entries.push(section),
        }
    }

    pub fn get(&self, section_type: SectionType) -> Option<&Section> {
        self.entries.iter().find(|s| s.section_type == section_type)
    }

    pub fn content(&self, section_type: SectionType) -> Option<&str> {
        self.get(section_type).map(|s| s.content.as_str())
    }

    pub fn contains(&self, section_type: SectionType) -> bool {
        self.get(section_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.entries.iter()
    }

    /// Section types in mapping order
    pub fn types(&self) -> Vec<SectionType> {
        self.entries.iter().map(|s| s.section_type).collect()
    }

    /// Core sections (requirements, design, implementation) that are absent
    pub fn missing_core(&self) -> Vec<SectionType> {
        [
            SectionType::Requirements,
            SectionType::Design,
            SectionType::Implementation,
        ]
        .into_iter()
        .filter(|t| !self.contains(*t))
        .collect()
    }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Section> for Sections {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        let mut sections = Sections::new();
        for section in iter {
            sections.insert(section);
        }
        sections
    }
}

/// A parsed CodeDrop. Never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDrop {
    pub name: String,
    pub sections: Sections,
    /// File path or other identifier the drop was read from
    pub origin: String,
}

impl CodeDrop {
    pub fn new(name: impl Into<String>, sections: Sections, origin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections,
            origin: origin.into(),
        }
    }

    /// Derives the drop name from a file path (its stem)
    pub fn name_from_path(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    /// Name as a sub-heading: underscores become spaces, words title-cased
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

/// `composer_drop` -> `Composer Drop`
pub fn title_case(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
