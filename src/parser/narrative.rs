use std::sync::LazyLock;

use regex::Regex;

use super::clean_text;
use crate::document::{Document, Node};

static ARCHITECTURAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ARCHITECTURAL DESCRIPTION:").unwrap());
static HISTORICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HISTORICAL NARRATIVE").unwrap());
static BIBLIOGRAPHY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BIBLIOGRAPHY").unwrap());

/// The three free-text sections of a survey form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narrative {
    pub architectural_description: String,
    pub historical_narrative: String,
    pub bibliography: String,
}

/// Each section is located on its own; a missing heading leaves only that
/// section empty.
pub fn segment(doc: &Document) -> Narrative {
    Narrative {
        architectural_description: section_text(doc, &ARCHITECTURAL_RE, Some(&*HISTORICAL_RE)),
        historical_narrative: section_text(doc, &HISTORICAL_RE, Some(&*BIBLIOGRAPHY_RE)),
        bibliography: section_text(doc, &BIBLIOGRAPHY_RE, None),
    }
}

/// Text of the paragraphs following `heading`, up to the first paragraph
/// mentioning `stop`. Paragraph texts are joined with a single space.
fn section_text(doc: &Document, heading: &Regex, stop: Option<&Regex>) -> String {
    let Some(text_path) = doc.find_text(|t| heading.is_match(t)) else {
        return String::new();
    };
    let Some((_, anchor)) = text_path.split_last() else {
        return String::new();
    };

    paragraphs_after(doc, anchor)
        .take_while(|p| !stop.is_some_and(|re| p.text_nodes().any(|t| re.is_match(t))))
        .map(|p| clean_text(&p.text()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Paragraph siblings after the element at `anchor`, lazily, in document
/// order. Other siblings are stepped over.
pub fn paragraphs_after<'a>(
    doc: &'a Document,
    anchor: &[usize],
) -> impl Iterator<Item = &'a Node> {
    doc.following_siblings(anchor).iter().filter(|n| n.is_element("p"))
}
