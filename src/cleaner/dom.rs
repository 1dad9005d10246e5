//! Owned HTML tree for the cleaner
//!
//! The parsed document is copied out of `scraper` into a small owned tree,
//! so cleaning passes can drop, unwrap and rewrite nodes before the tree is
//! serialized again. Comments, doctypes and processing instructions are not
//! carried over.

use scraper::{ElementRef, Html, Node};

/// Elements serialized without a closing tag and never treated as empty
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum CleanNode {
    Text(String),
    Element(CleanElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanElement {
    /// Lowercase tag name (SVG names keep their case)
    pub name: String,

    /// Attributes in document order
    pub attrs: Vec<(String, String)>,

    pub children: Vec<CleanNode>,
}

impl CleanElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// First element named `name` in depth-first order, including `self`
    pub fn find(&self, name: &str) -> Option<&CleanElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            CleanNode::Element(element) => element.find(name),
            CleanNode::Text(_) => None,
        })
    }

    /// Number of descendant elements named `name`
    pub fn count_descendants(&self, name: &str) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                CleanNode::Element(element) => {
                    usize::from(element.name == name) + element.count_descendants(name)
                }
                CleanNode::Text(_) => 0,
            })
            .sum()
    }

    /// Serializes the element and its subtree
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

/// Parses a document into an owned tree rooted at `<html>`
///
/// Parsing never fails; malformed markup is repaired by the HTML parser.
pub fn parse_document(html: &str) -> CleanElement {
    let document = Html::parse_document(html);
    convert(document.root_element())
}

fn convert(element: ElementRef<'_>) -> CleanElement {
    let value = element.value();

    let children = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(CleanNode::Text(String::from(&**text))),
            Node::Element(_) => ElementRef::wrap(child).map(|e| CleanNode::Element(convert(e))),
            _ => None,
        })
        .collect();

    CleanElement {
        name: value.name().to_string(),
        attrs: value
            .attrs()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect(),
        children,
    }
}

fn write_element(element: &CleanElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
    out.push('>');

    if element.is_void() {
        return;
    }

    for child in &element.children {
        match child {
            CleanNode::Text(text) => escape_into(text, false, out),
            CleanNode::Element(child) => write_element(child, out),
        }
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_comments_and_keeps_attributes() {
        let doc = parse_document(
            r#"<html><body><!-- note --><p class="intro" id="x">Hi</p></body></html>"#,
        );
        let p = doc.find("p").unwrap();
        assert_eq!(p.attr("class"), Some("intro"));
        assert_eq!(p.attr("id"), Some("x"));
        assert_eq!(doc.find("body").unwrap().to_html(), r#"<body><p class="intro" id="x">Hi</p></body>"#);
    }

    #[test]
    fn test_serialization_escapes() {
        let doc = parse_document(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#);
        assert_eq!(
            doc.find("p").unwrap().to_html(),
            r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let doc = parse_document("<p>line<br>next</p>");
        assert_eq!(doc.find("p").unwrap().to_html(), "<p>line<br>next</p>");
    }

    #[test]
    fn test_count_descendants() {
        let doc = parse_document(
            r#"<ul><li><a href="/1">1</a></li><li><a href="/2">2</a><a href="/3">3</a></li></ul>"#,
        );
        let ul = doc.find("ul").unwrap();
        assert_eq!(ul.count_descendants("a"), 3);
        assert_eq!(ul.count_descendants("li"), 2);
        assert_eq!(ul.count_descendants("ul"), 0);
    }
}
