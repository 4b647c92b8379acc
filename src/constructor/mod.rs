//! CodeDrop construction
//!
//! The inverse of extraction: reassembles one document from typed section
//! contents. Never invents content, only orders and wraps what it is given.

use std::collections::HashSet;

use crate::error::{CodeDropError, Result};
use crate::sections::markup::escape_text;
use crate::sections::{SectionParser, SectionType, Sections};

/// How section markers are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    /// The section's own heading line when it has one, `# Title` otherwise
    #[default]
    Original,
    /// Always `# Title`
    Heading,
    /// `<div class="section" id="...">` elements, content kept in `<pre>`
    Markup,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    order: Vec<SectionType>,
    include: Option<HashSet<SectionType>>,
    exclude: HashSet<SectionType>,
    mandatory: Vec<SectionType>,
    strict: bool,
    style: MarkerStyle,
}

impl Constructor {
    /// Canonical order, every canonical type, non-strict
    pub fn new() -> Self {
        Self {
            order: SectionType::CANONICAL_ORDER.to_vec(),
            include: None,
            exclude: HashSet::new(),
            mandatory: Vec::new(),
            strict: false,
            style: MarkerStyle::Original,
        }
    }

    /// Emit sections in this order. Types not listed are left out.
    pub fn order(mut self, order: Vec<SectionType>) -> Self {
        self.order = order;
        self
    }

    /// Restrict output to these types. `Unknown` is only ever emitted when
    /// included here and present in the order.
    pub fn include(mut self, types: impl IntoIterator<Item = SectionType>) -> Self {
        self.include = Some(types.into_iter().collect());
        self
    }

    pub fn exclude(mut self, types: impl IntoIterator<Item = SectionType>) -> Self {
        self.exclude = types.into_iter().collect();
        self
    }

    /// Strict mode: construction fails when one of `mandatory` has no content
    pub fn strict(mut self, mandatory: Vec<SectionType>) -> Self {
        self.strict = true;
        self.mandatory = mandatory;
        self
    }

    pub fn style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }

    fn selected(&self, section_type: SectionType) -> bool {
        if self.exclude.contains(&section_type) {
            return false;
        }
        match &self.include {
            Some(include) => include.contains(&section_type),
            None => section_type != SectionType::Unknown,
        }
    }

    /// Reassembles one document from `sections`
    pub fn construct(&self, sections: &Sections) -> Result<String> {
        if self.strict {
            for section_type in &self.mandatory {
                let present = sections
                    .content(*section_type)
                    .is_some_and(|content| !content.trim().is_empty());
                if !present {
                    return Err(CodeDropError::MissingSection(*section_type));
                }
            }
        }

        let mut blocks = Vec::new();
        let mut seen = HashSet::new();

        for section_type in &self.order {
            if !seen.insert(*section_type) || !self.selected(*section_type) {
                continue;
            }
            let Some(section) = sections.get(*section_type) else {
                continue;
            };

            blocks.push(match self.style {
                MarkerStyle::Original => {
                    format!("{}\n\n{}", original_marker(&section.source, *section_type), section.content)
                }
                MarkerStyle::Heading => format!("# {}\n\n{}", section_type.title(), section.content),
                MarkerStyle::Markup => format!(
                    "<div class=\"section\" id=\"{}\">\n<h2>{}</h2>\n<pre>{}</pre>\n</div>",
                    section_type,
                    section_type.title(),
                    escape_text(&section.content)
                ),
            });
        }

        let body = blocks.join("\n\n");
        Ok(match self.style {
            MarkerStyle::Markup => format!("<html>\n<body>\n{}\n</body>\n</html>\n", body),
            _ => format!("{}\n", body),
        })
    }
}

impl Default for Constructor {
    fn default() -> Self {
        Self::new()
    }
}

/// A heading-dialect source marker that still maps to the same type, or a
/// plain level-1 heading
fn original_marker(source: &str, section_type: SectionType) -> String {
    match SectionParser::parse_marker(source) {
        Some(heading) if SectionType::from_label(&heading.label) == section_type => heading.marker,
        _ => format!("# {}", section_type.title()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{MarkupParser, Section};

    fn sample() -> Sections {
        vec![
            Section::new(SectionType::Testing, "```python\nassert f() == 1\n```", "## Testing:"),
            Section::new(SectionType::Requirements, "- f returns 1", "## Requirements:"),
            Section::new(SectionType::Implementation, "```python\ndef f():\n    return 1\n```", "<div id=\"implementation\">"),
            Section::new(SectionType::Unknown, "stray notes", "# Notes"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_construct_canonical_order() {
        let document = Constructor::new().construct(&sample()).unwrap();

        let requirements = document.find("## Requirements:").unwrap();
        let implementation = document.find("# Implementation").unwrap();
        let testing = document.find("## Testing:").unwrap();
        assert!(requirements < implementation && implementation < testing);
        assert!(!document.contains("stray notes"));
        assert!(document.ends_with("```\n"));
    }

    #[test]
    fn test_round_trip_heading() {
        let sections = sample();
        let document = Constructor::new().construct(&sections).unwrap();
        let parsed = SectionParser::parse(&document);

        for section_type in SectionType::CANONICAL_ORDER {
            assert_eq!(parsed.content(section_type), sections.content(section_type));
        }
    }

    #[test]
    fn test_round_trip_markup() {
        let sections = sample();
        let document = Constructor::new()
            .style(MarkerStyle::Markup)
            .construct(&sections)
            .unwrap();
        let parsed = MarkupParser::parse(&document);

        assert_eq!(parsed.len(), 3);
        for section_type in SectionType::CANONICAL_ORDER {
            assert_eq!(parsed.content(section_type), sections.content(section_type));
        }
        assert_eq!(
            parsed.get(SectionType::Implementation).unwrap().unwrapped(),
            "def f():\n    return 1"
        );
    }

    #[test]
    fn test_round_trip_markup_keeps_indentation() {
        let sections: Sections = vec![Section::new(
            SectionType::Implementation,
            "    x = 1\n    if x:\n        y = 2",
            "## Implementation",
        )]
        .into_iter()
        .collect();

        let document = Constructor::new()
            .style(MarkerStyle::Markup)
            .construct(&sections)
            .unwrap();
        let parsed = MarkupParser::parse(&document);

        assert_eq!(
            parsed.content(SectionType::Implementation),
            Some("    x = 1\n    if x:\n        y = 2")
        );
    }

    #[test]
    fn test_custom_order_and_exclude() {
        let document = Constructor::new()
            .order(vec![SectionType::Testing, SectionType::Requirements, SectionType::Implementation])
            .exclude([SectionType::Implementation])
            .construct(&sample())
            .unwrap();

        assert!(document.starts_with("## Testing:"));
        assert!(!document.contains("def f()"));
    }

    #[test]
    fn test_include_unknown_explicitly() {
        let document = Constructor::new()
            .order(vec![SectionType::Requirements, SectionType::Unknown])
            .include([SectionType::Requirements, SectionType::Unknown])
            .construct(&sample())
            .unwrap();

        assert!(document.contains("# Notes\n\nstray notes"));
    }

    #[test]
    fn test_strict_missing_section() {
        let result = Constructor::new()
            .strict(vec![SectionType::Requirements, SectionType::Design])
            .construct(&sample());

        assert!(matches!(result, Err(CodeDropError::MissingSection(SectionType::Design))));
    }

    #[test]
    fn test_non_strict_skips_missing() {
        let document = Constructor::new().construct(&sample()).unwrap();
        assert!(!document.contains("Design"));
    }

    #[test]
    fn test_comment_markers_kept() {
        let sections = SectionParser::parse("// Design\nlayers\n\n/* Implementation */\nfn f() {}\n");
        let document = Constructor::new().construct(&sections).unwrap();

        assert_eq!(document, "// Design\n\nlayers\n\n/* Implementation */\n\nfn f() {}\n");
        assert_eq!(SectionParser::parse(&document), sections);
    }

    #[test]
    fn test_heading_style() {
        let document = Constructor::new()
            .style(MarkerStyle::Heading)
            .construct(&sample())
            .unwrap();
        assert!(document.starts_with("# Requirements\n\n- f returns 1"));
    }

    #[test]
    fn test_empty_sections() {
        assert_eq!(Constructor::new().construct(&Sections::new()).unwrap(), "\n");
    }
}
