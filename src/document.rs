use std::path::Path;

use scraper::{ElementRef, Html};

use crate::error::LoadError;

/// One node of a parsed document. Comments, doctypes and processing
/// instructions are dropped during conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text(_) => None,
        }
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.tag() == Some(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text(_) => &[],
        }
    }

    /// All nodes below this one, pre-order (document order). Excludes `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children().iter().rev().collect(),
        }
    }

    /// Descendant elements named `name`, in document order.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.descendants().filter(move |n| n.is_element(name))
    }

    /// Descendant text nodes, in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = &str> {
        let own = match self {
            Node::Text(t) => Some(t.as_str()),
            Node::Element { .. } => None,
        };
        own.into_iter().chain(self.descendants().filter_map(|n| match n {
            Node::Text(t) => Some(t.as_str()),
            Node::Element { .. } => None,
        }))
    }

    /// Raw concatenation of every descendant text node, no separators.
    pub fn text(&self) -> String {
        self.text_nodes().collect()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// A parsed source document rooted at its `<html>` element.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Best-effort HTML5 parse. Never fails: broken markup only degrades
    /// what later stages can find.
    pub fn parse(raw: &str) -> Self {
        let html = Html::parse_document(raw);
        Self {
            root: convert_element(html.root_element()),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Child-index path from the root to the first text node (document order)
    /// satisfying `pred`.
    pub fn find_text(&self, pred: impl Fn(&str) -> bool) -> Option<Vec<usize>> {
        fn walk(node: &Node, pred: &dyn Fn(&str) -> bool, path: &mut Vec<usize>) -> bool {
            for (i, child) in node.children().iter().enumerate() {
                path.push(i);
                let hit = match child {
                    Node::Text(t) => pred(t),
                    Node::Element { .. } => walk(child, pred, path),
                };
                if hit {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        walk(&self.root, &pred, &mut path).then_some(path)
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, &i| node.children().get(i))
    }

    /// Siblings that come after the node at `path`, in document order.
    /// The root has none.
    pub fn following_siblings(&self, path: &[usize]) -> &[Node] {
        let Some((&last, parent_path)) = path.split_last() else {
            return &[];
        };
        self.node_at(parent_path)
            .map(|parent| parent.children())
            .and_then(|siblings| siblings.get(last + 1..))
            .unwrap_or(&[])
    }
}

fn convert_element(el: ElementRef) -> Node {
    let children = el
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::Text(text.to_string())),
            scraper::Node::Element(_) => ElementRef::wrap(child).map(convert_element),
            _ => None,
        })
        .collect();

    Node::Element {
        tag: el.value().name().to_string(),
        attributes: el
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

/// Read and parse one source document.
pub fn load(path: &Path) -> Result<Document, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = String::from_utf8(bytes).map_err(|source| LoadError::NotText {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::parse(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unclosed_tags() {
        let doc = Document::parse("<!DOCTYPE html><p>one<p>two<table><tr><td>cell</table>");
        let paragraphs: Vec<_> = doc.root().elements("p").map(Node::text).collect();
        assert_eq!(paragraphs, vec!["one", "two"]);
        assert_eq!(doc.root().elements("td").count(), 1);
    }

    #[test]
    fn decodes_entities() {
        let doc = Document::parse("<p>A&nbsp;&amp;&nbsp;B</p>");
        let p = doc.root().elements("p").next().unwrap();
        assert_eq!(p.text(), "A\u{a0}&\u{a0}B");
    }

    #[test]
    fn attributes_and_missing_attributes() {
        let doc = Document::parse(r#"<img src="a.jpg" alt="front">"#);
        let img = doc.root().elements("img").next().unwrap();
        assert_eq!(img.attr("src"), Some("a.jpg"));
        assert_eq!(img.attr("alt"), Some("front"));
        assert_eq!(img.attr("style"), None);
    }

    #[test]
    fn descendants_are_document_order() {
        let doc = Document::parse("<div><p>a<b>b</b></p>c</div><p>d</p>");
        let texts: Vec<_> = doc.root().text_nodes().collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn comments_are_dropped() {
        let doc = Document::parse("<p>a<!-- hidden -->b</p>");
        let p = doc.root().elements("p").next().unwrap();
        assert_eq!(p.text(), "ab");
    }

    #[test]
    fn find_text_and_siblings() {
        let doc = Document::parse("<body><p>first</p><p>MARK</p><p>after</p></body>");
        let path = doc.find_text(|t| t == "MARK").unwrap();
        let container = &path[..path.len() - 1];
        assert!(doc.node_at(container).unwrap().is_element("p"));
        let after: Vec<_> = doc
            .following_siblings(container)
            .iter()
            .map(Node::text)
            .collect();
        assert_eq!(after, vec!["after"]);
    }

    #[test]
    fn find_text_missing() {
        let doc = Document::parse("<p>nothing here</p>");
        assert!(doc.find_text(|t| t.contains("MARK")).is_none());
    }

    #[test]
    fn root_has_no_siblings() {
        let doc = Document::parse("<p>x</p>");
        assert!(doc.following_siblings(&[]).is_empty());
    }

    #[test]
    fn load_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.html");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(load(&path), Err(LoadError::NotText { .. })));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.html");
        assert!(matches!(load(&path), Err(LoadError::Io { .. })));
    }
}
