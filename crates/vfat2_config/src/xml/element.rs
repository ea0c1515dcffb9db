//! Owned element tree used on the write side, and its XML serializer.

/// A write-side XML element.
///
/// An element holds either text or child elements; setting both is allowed
/// but the serializer writes the text before the children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    /// Text content.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create an element holding only text.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element in place.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Serialize as a standalone document with an XML declaration.
    pub fn to_document_string(&self) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_into(&mut xml, 0);
        xml
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", key, escape_xml(value)));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        match (text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                out.push_str(&format!(">{}</{}>\n", escape_xml(text), self.name));
            }
            (text, false) => {
                out.push('>');
                if let Some(text) = text {
                    out.push_str(&escape_xml(text));
                }
                out.push('\n');
                for child in &self.children {
                    child.write_into(out, depth + 1);
                }
                out.push_str(&indent);
                out.push_str(&format!("</{}>\n", self.name));
            }
        }
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_tree() {
        let tree = Element::new("ROOT").child(
            Element::new("PART")
                .attr("channel", "3")
                .child(Element::with_text("DATA", "5").attr("name", "Latency")),
        );

        let xml = tree.to_document_string();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <ROOT>\n\
             \x20\x20<PART channel=\"3\">\n\
             \x20\x20\x20\x20<DATA name=\"Latency\">5</DATA>\n\
             \x20\x20</PART>\n\
             </ROOT>\n"
        );
    }

    #[test]
    fn empty_text_collapses_to_self_closing() {
        let xml = Element::with_text("LOCATION", "").to_document_string();
        assert!(xml.ends_with("<LOCATION/>\n"));
    }

    #[test]
    fn escapes_text_and_attributes() {
        let xml = Element::with_text("COMMENT_DESCRIPTION", "gain < 3 & \"fast\"")
            .attr("note", "a'b")
            .to_document_string();

        assert!(xml.contains("gain &lt; 3 &amp; &quot;fast&quot;"));
        assert!(xml.contains("note=\"a&apos;b\""));

        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().text(), Some("gain < 3 & \"fast\""));
    }
}
