//! Per-section-type merge rules
//!
//! Code sections hoist their import lines into one sorted, de-duplicated
//! preamble and then list each drop's remaining code under a comment
//! sub-heading. Prose sections list each drop's content under a markdown
//! sub-heading.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::header::ArtifactHeader;
use crate::languages::{LanguageHeuristic, LanguageRegistry};
use crate::sections::parser::trim_blank_lines;
use crate::sections::{CodeDrop, Section, SectionType};

/// One merged output file for a single section type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeArtifact {
    pub section_type: SectionType,
    pub text: String,
    /// File extension without the dot
    pub extension: &'static str,
    /// Contributing drop names in insertion order
    pub drops: Vec<String>,
}

impl CompositeArtifact {
    /// `{composite_name}_{type}.{extension}`
    pub fn file_name(&self, composite_name: &str) -> String {
        format!("{}_{}.{}", composite_name, self.section_type, self.extension)
    }
}

/// A drop's section of the type being merged
pub(crate) struct Contribution<'a> {
    pub drop: &'a CodeDrop,
    pub section: &'a Section,
}

/// Import lines and remaining code of one code body
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SplitCode {
    pub imports: Vec<String>,
    pub body: String,
}

pub(crate) fn split_imports(code: &str, language: &dyn LanguageHeuristic) -> SplitCode {
    let lines: Vec<&str> = code.lines().collect();
    let mut imports = Vec::new();
    let mut rest = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        match language.import_span(&lines[i..]) {
            Some(span) => {
                let end = (i + span.max(1)).min(lines.len());
                let statement: Vec<&str> = lines[i..end].iter().map(|l| l.trim_end()).collect();
                imports.push(statement.join("\n"));
                i = end;
            }
            None => {
                rest.push(lines[i]);
                i += 1;
            }
        }
    }

    SplitCode {
        imports,
        body: trim_blank_lines(&rest.join("\n")),
    }
}

pub(crate) fn merge_code(
    composite_name: &str,
    section_type: SectionType,
    contributions: &[Contribution],
    registry: &LanguageRegistry,
    generated_on: &str,
) -> CompositeArtifact {
    let combined: Vec<&str> = contributions.iter().map(|c| c.section.unwrapped()).collect();
    let language = registry.infer(&combined.join("\n\n"));

    let splits: Vec<SplitCode> = combined
        .iter()
        .map(|code| split_imports(code, language.as_ref()))
        .collect();
    let imports: BTreeSet<&str> = splits
        .iter()
        .flat_map(|s| s.imports.iter().map(String::as_str))
        .collect();

    let drops: Vec<String> = contributions.iter().map(|c| c.drop.name.clone()).collect();
    let header = ArtifactHeader::new(composite_name, section_type, drops.clone(), generated_on);

    let mut text = header.code(language.as_ref());
    text.push('\n');

    if !imports.is_empty() {
        for import in &imports {
            text.push_str(import);
            text.push('\n');
        }
        text.push('\n');
    }

    for (contribution, split) in contributions.iter().zip(&splits) {
        text.push_str(&language.sub_heading(&contribution.drop.name));
        text.push('\n');
        if !split.body.is_empty() {
            text.push_str(&split.body);
            text.push('\n');
        }
        text.push('\n');
    }

    if section_type == SectionType::Testing {
        text.push_str(&language.completion_marker());
        text.push('\n');
    }

    CompositeArtifact {
        section_type,
        text: finish(text),
        extension: language.extension(),
        drops,
    }
}

pub(crate) fn merge_prose(
    composite_name: &str,
    section_type: SectionType,
    contributions: &[Contribution],
    generated_on: &str,
) -> Result<CompositeArtifact> {
    let drops: Vec<String> = contributions.iter().map(|c| c.drop.name.clone()).collect();
    let header = ArtifactHeader::new(composite_name, section_type, drops.clone(), generated_on);

    let mut text = header.markdown()?;
    text.push('\n');

    for contribution in contributions {
        text.push_str(&format!(
            "## {}\n\n{}\n\n",
            contribution.drop.display_name(),
            contribution.section.content
        ));
    }

    Ok(CompositeArtifact {
        section_type,
        text: finish(text),
        extension: "md",
        drops,
    })
}

/// Exactly one trailing newline
fn finish(text: String) -> String {
    let mut text = text.trim_end().to_string();
    text.push('\n');
    text
}
