//! Markup-dialect section parser
//!
//! HTML CodeDrops mark sections with an element whose `id` names the section
//! (`<div class="section" id="design">`). The document is parsed into a DOM
//! and the section content is the element's visible text.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::parser::{strip_fences, unwrap_fences};
use super::{Section, SectionType, Sections};

/// Elements whose text never belongs to a section
const HIDDEN_TAGS: [&str; 3] = ["script", "style", "template"];

/// The first of these inside a section element is its title
const TITLE_TAGS: [&str; 3] = ["h1", "h2", "h3"];

/// Parser for markup CodeDrops
pub struct MarkupParser;

impl MarkupParser {
    /// Parse a markup document into its sections.
    ///
    /// Elements are taken in document order; sections nested inside another
    /// section element belong to the outer one's text.
    pub fn parse(markup: &str) -> Sections {
        let dom = parse_dom(markup);
        let mut elements = Vec::new();
        collect_section_elements(&dom.document, &mut elements);

        elements
            .into_iter()
            .map(|(section_type, element)| build_section(section_type, &element))
            .collect()
    }

    /// Whether the text holds at least one section element outside fenced
    /// code regions
    pub fn detect(text: &str) -> bool {
        let dom = parse_dom(&strip_fences(text));
        let mut elements = Vec::new();
        collect_section_elements(&dom.document, &mut elements);
        !elements.is_empty()
    }
}

fn parse_dom(markup: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(markup)
}

fn attribute(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.trim().to_string())
}

fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some((*name.local).to_ascii_lowercase()),
        _ => None,
    }
}

fn section_type_of(node: &Handle) -> SectionType {
    match &node.data {
        NodeData::Element { attrs, .. } => attribute(&attrs.borrow(), "id")
            .map(|id| SectionType::from_label(&id))
            .unwrap_or(SectionType::Unknown),
        _ => SectionType::Unknown,
    }
}

fn collect_section_elements(node: &Handle, found: &mut Vec<(SectionType, Handle)>) {
    let section_type = section_type_of(node);
    if section_type != SectionType::Unknown {
        found.push((section_type, node.clone()));
        return;
    }

    for child in node.children.borrow().iter() {
        collect_section_elements(child, found);
    }
}

fn build_section(section_type: SectionType, element: &Handle) -> Section {
    let mut collector = TextCollector::default();
    for child in element.children.borrow().iter() {
        collector.walk(child, false);
    }

    let mut section = Section::new(section_type, collector.finish(), open_tag(element));

    if section_type.is_code() {
        let mut blocks = Vec::new();
        collect_code_blocks(element, &mut blocks);

        section.code = if blocks.is_empty() {
            unwrap_fences(&section.content)
        } else {
            Some(blocks.join("\n\n"))
        };
    }

    section
}

/// `<tag id="...">` of a section element
fn open_tag(element: &Handle) -> String {
    match &element.data {
        NodeData::Element { name, attrs, .. } => {
            let id = attribute(&attrs.borrow(), "id").unwrap_or_default();
            format!("<{} id=\"{}\">", &*name.local, id)
        }
        _ => String::new(),
    }
}

fn collect_code_blocks(node: &Handle, blocks: &mut Vec<String>) {
    for child in node.children.borrow().iter() {
        match element_name(child).as_deref() {
            Some("code") => blocks.push(raw_text(child)),
            Some(tag) if HIDDEN_TAGS.contains(&tag) => {}
            _ => collect_code_blocks(child, blocks),
        }
    }
}

/// Every text node under `node`, concatenated
fn raw_text(node: &Handle) -> String {
    let mut text = String::new();
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => text.push_str(&raw_text(child)),
            _ => {}
        }
    }
    text
}

/// One output line and whether its first character came from a `<pre>`
#[derive(Debug, Default)]
struct Line {
    text: String,
    preformatted: bool,
}

/// Visible text of a section element, line by line
#[derive(Debug)]
struct TextCollector {
    lines: Vec<Line>,
    title_skipped: bool,
}

impl Default for TextCollector {
    fn default() -> Self {
        Self {
            lines: vec![Line::default()],
            title_skipped: false,
        }
    }
}

impl TextCollector {
    fn walk(&mut self, node: &Handle, preformatted: bool) {
        match &node.data {
            NodeData::Text { contents } => self.push(&contents.borrow(), preformatted),
            NodeData::Element { name, .. } => {
                let tag = (*name.local).to_ascii_lowercase();
                if HIDDEN_TAGS.contains(&tag.as_str()) {
                    return;
                }
                if TITLE_TAGS.contains(&tag.as_str()) && !self.title_skipped {
                    self.title_skipped = true;
                    return;
                }
                if tag == "br" {
                    self.push("\n", preformatted);
                    return;
                }

                let preformatted = preformatted || tag == "pre";
                for child in node.children.borrow().iter() {
                    self.walk(child, preformatted);
                }
            }
            _ => {}
        }
    }

    fn push(&mut self, text: &str, preformatted: bool) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.lines.push(Line::default());
            }
            if part.is_empty() {
                continue;
            }
            if let Some(line) = self.lines.last_mut() {
                if line.text.is_empty() {
                    line.preformatted = preformatted;
                }
                line.text.push_str(part);
            }
        }
    }

    /// Outer blank lines dropped and the indentation shared by all lines
    /// outside `<pre>` removed. Preformatted lines are kept verbatim.
    fn finish(self) -> String {
        let lines = self.lines;
        let is_blank = |line: &Line| line.text.trim().is_empty();

        let Some(start) = lines.iter().position(|l| !is_blank(l)) else {
            return String::new();
        };
        let end = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(start);
        let lines = &lines[start..=end];

        let indent = lines
            .iter()
            .filter(|l| !l.preformatted && !is_blank(l))
            .map(|l| l.text.len() - l.text.trim_start().len())
            .min()
            .unwrap_or(0);

        lines
            .iter()
            .map(|l| {
                if l.preformatted {
                    l.text.as_str()
                } else {
                    l.text
                        .get(indent..)
                        .unwrap_or_else(|| l.text.trim_start())
                        .trim_end()
                }
            })
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

/// Escapes the characters that are significant in markup text
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
