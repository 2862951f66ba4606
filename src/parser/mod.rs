pub mod labels;
pub mod narrative;
pub mod tables;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{self, Document};
use crate::error::LoadError;
use crate::record::{identifier_from_path, PropertyRecord};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs (non-breaking spaces included) to one space and
/// trim. A literal `&nbsp;` that survived decoding counts as a space.
pub fn clean_text(raw: &str) -> String {
    let decoded = raw.replace("&nbsp;", " ");
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Loader → {tables, narrative} → record, for one file on disk.
pub fn process_document(path: &Path) -> Result<PropertyRecord, LoadError> {
    let identifier = identifier_from_path(path)?;
    let doc = document::load(path)?;
    Ok(extract_record(identifier, path.display().to_string(), &doc))
}

/// Table and narrative passes over an already parsed document.
pub fn extract_record(identifier: String, source_path: String, doc: &Document) -> PropertyRecord {
    let tables = tables::extract_tables(doc.root());
    let narrative = narrative::segment(doc);
    PropertyRecord::assemble(identifier, source_path, tables, narrative)
}

// ── Tests ──
