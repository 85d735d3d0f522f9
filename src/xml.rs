//! The XML tree output type.
//!
//! The tree itself is an opaque builder surface: create an element with a
//! qualified name, add an attribute, set text, append a child. This crate
//! still has to produce *something* concrete as its return type, so
//! [`Element`] implements exactly that minimal builder surface and
//! nothing more — no validation, no namespace resolution beyond carrying
//! the prefix string through unchanged.

use indexmap::IndexMap;
use std::fmt;

/// A qualified name: `prefix:local` or bare `local` when `prefix` is
/// empty. Kept as a small value type rather than passing `(String,
/// String)` pairs around.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: String,
    pub local: String,
}

impl QName {
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    pub fn unprefixed(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

/// One node of the decoded XML tree. Attribute order and child order are
/// preserved exactly as read: attributes use an [`IndexMap`] rather than
/// a sorted or hashed map.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: QName,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: QName) -> Self {
        Self {
            tag,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Adds an attribute, preserving first-seen order if the key repeats
    /// (a repeated key overwrites its value in place rather than moving
    /// to the end).
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Renders the element as XML text. Not part of the decoder's
    /// contract — re-encoding to NBFX is out of scope here — but a
    /// convenient, obviously-correct way to assert decoded shape in
    /// tests without hand-walking the tree.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag.to_string());
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.tag.to_string());
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_renders_with_and_without_prefix() {
        assert_eq!(QName::new("a", "test").to_string(), "a:test");
        assert_eq!(QName::unprefixed("test").to_string(), "test");
    }

    #[test]
    fn element_renders_attributes_in_insertion_order() {
        let mut el = Element::new(QName::new("a", "test"));
        el.set_attribute("z", "1");
        el.set_attribute("a", "2");
        assert_eq!(el.to_xml_string(), r#"<a:test z="1" a="2"></a:test>"#);
    }
}
