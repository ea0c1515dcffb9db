//! Read-only traversal helpers over a parsed `roxmltree` document.
//!
//! Absent attributes and text come back as `None`; optional schema fields
//! are allowed to be empty, so the callers decide what absence means.

use roxmltree::Node;

/// Number of children of any kind (elements, text, comments).
pub fn child_count(node: Node<'_, '_>) -> usize {
    node.children().count()
}

/// Number of element children, skipping whitespace text and comments.
pub fn element_child_count(node: Node<'_, '_>) -> usize {
    element_children(node).count()
}

/// Iterate over the element children of a node in document order.
pub fn element_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Local tag name of an element (empty for non-element nodes).
pub fn tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Attribute value by key.
pub fn attribute<'a>(node: Node<'a, '_>, key: &str) -> Option<&'a str> {
    node.attribute(key)
}

/// Trimmed text content of an element.
pub fn text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<RUN>
    <!-- operator notes -->
    <RUN_NAME>  cosmics  </RUN_NAME>
    <LOCATION/>
    <USER id="7">alice</USER>
</RUN>"#;

    #[test]
    fn element_count_skips_whitespace_and_comments() {
        let doc = roxmltree::Document::parse(SAMPLE).unwrap();
        let root = doc.root_element();

        assert_eq!(element_child_count(root), 3);
        assert!(child_count(root) > element_child_count(root));
    }

    #[test]
    fn text_is_trimmed_and_empty_is_absent() {
        let doc = roxmltree::Document::parse(SAMPLE).unwrap();
        let root = doc.root_element();

        let texts: Vec<Option<&str>> = element_children(root).map(text).collect();
        assert_eq!(texts, [Some("cosmics"), None, Some("alice")]);
    }

    #[test]
    fn attribute_lookup() {
        let doc = roxmltree::Document::parse(SAMPLE).unwrap();
        let user = element_children(doc.root_element())
            .find(|n| tag_name(*n) == "USER")
            .unwrap();

        assert_eq!(attribute(user, "id"), Some("7"));
        assert_eq!(attribute(user, "name"), None);
        assert_eq!(tag_name(user), "USER");
    }
}
