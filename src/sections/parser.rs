//! Heading-dialect section parser
//!
//! Splits a markdown-like CodeDrop into typed sections at `#` heading lines
//! (or `// Design` / `/* Design */` comment markers in source files) and
//! unwraps fenced code blocks in code sections.

use super::{Section, SectionType, Sections};

/// A section marker line (`## Design:`, `// Design`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1-6)
    pub level: u8,
    /// Marker text without the leading `#` run or comment delimiters
    pub label: String,
    /// The full heading line, trimmed
    pub marker: String,
}

/// An opening code fence
#[derive(Debug, Clone, Copy)]
struct Fence {
    ch: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let ch = trimmed.chars().next()?;
        if ch != '`' && ch != '~' {
            return None;
        }
        let len = trimmed.chars().take_while(|&c| c == ch).count();
        (len >= 3).then_some(Fence { ch, len })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|&c| c == self.ch).count();
        len >= self.len && trimmed[len * self.ch.len_utf8()..].trim().is_empty()
    }
}

/// Section currently being accumulated
struct OpenSection<'a> {
    section_type: SectionType,
    level: u8,
    marker: String,
    lines: Vec<&'a str>,
}

/// Parser for heading-delimited CodeDrops
pub struct SectionParser;

impl SectionParser {
    /// Parse a heading-delimited document into its sections.
    ///
    /// A document without any heading yields an empty mapping.
    pub fn parse(content: &str) -> Sections {
        let mut sections = Sections::new();
        let mut current: Option<OpenSection> = None;
        let mut fence: Option<Fence> = None;

        for line in content.lines() {
            if let Some(open) = fence {
                if open.closes(line) {
                    fence = None;
                }
                if let Some(ref mut section) = current {
                    section.lines.push(line);
                }
                continue;
            }

            if let Some(open) = Fence::open(line) {
                fence = Some(open);
                if let Some(ref mut section) = current {
                    section.lines.push(line);
                }
                continue;
            }

            if let Some(heading) = Self::parse_marker(line) {
                let section_type = SectionType::from_label(&heading.label);
                if !Self::opens_section(section_type, &heading, current.as_ref()) {
                    if let Some(ref mut section) = current {
                        section.lines.push(line);
                    }
                    continue;
                }

                if let Some(done) = current.take() {
                    Self::finish(done, &mut sections);
                }
                current = Some(OpenSection {
                    section_type,
                    level: heading.level,
                    marker: heading.marker,
                    lines: Vec::new(),
                });
                continue;
            }

            if let Some(ref mut section) = current {
                section.lines.push(line);
            }
        }

        if let Some(done) = current.take() {
            Self::finish(done, &mut sections);
        }

        sections
    }

    /// Recognize a heading line: 1-6 `#` followed by whitespace and a label.
    ///
    /// `#include <stdio.h>` or `#!/bin/sh` are not headings.
    pub fn parse_heading(line: &str) -> Option<Heading> {
        let trimmed = line.trim();
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        if level == 0 || level > 6 {
            return None;
        }

        let rest = &trimmed[level..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let label = rest.trim().trim_end_matches('#').trim();
        if label.is_empty() {
            return None;
        }

        Some(Heading {
            level: level as u8,
            label: label.to_string(),
            marker: trimmed.to_string(),
        })
    }

    /// Recognize a comment-style marker: a whole line `// Label` or
    /// `/* Label */` (any number of `/` or `*`) whose label names a section
    /// type. Other comments are ordinary content.
    ///
    /// Comment markers rank as level-1 headings.
    pub fn parse_comment_marker(line: &str) -> Option<Heading> {
        let trimmed = line.trim();

        let label = if let Some(rest) = trimmed.strip_prefix("//") {
            rest.trim_start_matches('/')
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            rest.trim_start_matches('*')
                .strip_suffix("*/")?
                .trim_end_matches('*')
        } else {
            return None;
        };

        let label = label.trim();
        if SectionType::from_label(label) == SectionType::Unknown {
            return None;
        }

        Some(Heading {
            level: 1,
            label: label.to_string(),
            marker: trimmed.to_string(),
        })
    }

    /// A heading line or a comment-style marker
    pub fn parse_marker(line: &str) -> Option<Heading> {
        Self::parse_heading(line).or_else(|| Self::parse_comment_marker(line))
    }

    /// Canonical headings always open a section. Other headings stay part of
    /// the open section when it holds code or when they are nested below it.
    fn opens_section(
        section_type: SectionType,
        heading: &Heading,
        current: Option<&OpenSection>,
    ) -> bool {
        if section_type != SectionType::Unknown {
            return true;
        }
        match current {
            Some(open) => !open.section_type.is_code() && heading.level <= open.level,
            None => true,
        }
    }

    fn finish(open: OpenSection, sections: &mut Sections) {
        let content = trim_blank_lines(&open.lines.join("\n"));

        // Titles and other unrecognized headings with nothing under them
        if open.section_type == SectionType::Unknown && content.trim().is_empty() {
            return;
        }

        let mut section = Section::new(open.section_type, content, open.marker);
        if open.section_type.is_code() {
            section.code = unwrap_fences(&section.content);
        }
        sections.insert(section);
    }
}

/// Literal contents of all fenced code regions, in document order, joined
/// by a blank line. `None` when the text has no fences.
///
/// An unterminated fence runs to the end of the text.
pub fn unwrap_fences(content: &str) -> Option<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut fence: Option<Fence> = None;
    let mut block: Vec<&str> = Vec::new();

    for line in content.lines() {
        match fence {
            Some(open) if open.closes(line) => {
                blocks.push(block.join("\n"));
                block.clear();
                fence = None;
            }
            Some(_) => block.push(line),
            None => fence = Fence::open(line),
        }
    }

    if fence.is_some() {
        blocks.push(block.join("\n"));
    }

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

/// Text with the fenced regions removed, fences included
pub(crate) fn strip_fences(content: &str) -> String {
    let mut kept = Vec::new();
    let mut fence: Option<Fence> = None;

    for line in content.lines() {
        match fence {
            Some(open) => {
                if open.closes(line) {
                    fence = None;
                }
            }
            None => match Fence::open(line) {
                Some(open) => fence = Some(open),
                None => kept.push(line),
            },
        }
    }

    kept.join("\n")
}

/// Drop leading and trailing whitespace-only lines, keep everything between
pub(crate) fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
