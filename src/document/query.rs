//! Read-only navigation over the document tree
//!
//! Sibling lookups skip whitespace-only text nodes, since markup indentation
//! produces them between almost every pair of elements.

use super::models::*;

pub fn parent(document: &Document, id: NodeId) -> Option<NodeId> {
    document.node(id)?.parent
}

pub fn first_child(document: &Document, id: NodeId) -> Option<NodeId> {
    document.node(id)?.children.first().copied()
}

/// First child of `id` if it is a text node
pub fn first_text_child(document: &Document, id: NodeId) -> Option<NodeId> {
    first_child(document, id).filter(|&child| document.is_text(child))
}

/// Nearest following sibling that is not a blank text node
pub fn next_sibling(document: &Document, id: NodeId) -> Option<NodeId> {
    let (siblings, position) = sibling_position(document, id)?;
    siblings[position + 1..]
        .iter()
        .copied()
        .find(|&sibling| !is_blank_text(document, sibling))
}

/// Nearest preceding sibling that is not a blank text node
pub fn prev_sibling(document: &Document, id: NodeId) -> Option<NodeId> {
    let (siblings, position) = sibling_position(document, id)?;
    siblings[..position]
        .iter()
        .rev()
        .copied()
        .find(|&sibling| !is_blank_text(document, sibling))
}

pub fn is_blank_text(document: &Document, id: NodeId) -> bool {
    document
        .text(id)
        .is_some_and(|value| value.trim().is_empty())
}

/// Concatenated text of every text node below `id`, in document order
pub fn text_content(document: &Document, id: NodeId) -> String {
    let mut content = String::new();
    let mut walker = TextWalker::new(id, &[]);
    if let Some(value) = document.text(id) {
        content.push_str(value);
    }
    while let Some(text) = walker.next_node(document) {
        if let Some(value) = document.text(text) {
            content.push_str(value);
        }
    }
    content
}

fn sibling_position(document: &Document, id: NodeId) -> Option<(&[NodeId], usize)> {
    let parent = document.node(id)?.parent?;
    let siblings = &document.node(parent)?.children;
    let position = siblings.iter().position(|&sibling| sibling == id)?;
    Some((siblings, position))
}

/// Depth-first producer of the text nodes below a root.
///
/// The walker holds no borrow of the document between steps, so callers may
/// rewrite text while iterating. Text nodes whose immediate parent carries an
/// excluded tag are skipped; the comparison ignores ASCII case.
#[derive(Debug, Clone)]
pub struct TextWalker<'a> {
    root: Option<NodeId>,
    pending: Vec<NodeId>,
    excluded: &'a [String],
}

impl<'a> TextWalker<'a> {
    pub fn new(root: NodeId, excluded: &'a [String]) -> Self {
        TextWalker {
            root: Some(root),
            pending: Vec::new(),
            excluded,
        }
    }

    /// Advance to the next eligible text node
    pub fn next_node(&mut self, document: &Document) -> Option<NodeId> {
        // The root itself is never produced, only its descendants
        if let Some(root) = self.root.take() {
            if let Some(node) = document.node(root) {
                self.pending.extend(node.children.iter().rev().copied());
            }
        }

        while let Some(id) = self.pending.pop() {
            let Some(node) = document.node(id) else {
                continue;
            };
            match &node.kind {
                NodeKind::Element { .. } => {
                    self.pending.extend(node.children.iter().rev().copied());
                }
                NodeKind::Text { .. } => {
                    if !self.is_excluded(document, node.parent) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    fn is_excluded(&self, document: &Document, parent: Option<NodeId>) -> bool {
        let Some(tag) = parent.and_then(|parent| document.tag(parent)) else {
            return false;
        };
        self.excluded
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(document: &Document, root: NodeId, excluded: &[String]) -> Vec<String> {
        let mut walker = TextWalker::new(root, excluded);
        let mut values = Vec::new();
        while let Some(id) = walker.next_node(document) {
            values.push(document.text(id).unwrap_or_default().to_string());
        }
        values
    }

    #[test]
    fn test_walker_visits_in_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, "p").unwrap();
        doc.append_text(p, "one").unwrap();
        let b = doc.append_element(p, "b").unwrap();
        doc.append_text(b, "two").unwrap();
        doc.append_text(p, "three").unwrap();
        doc.append_text(root, "four").unwrap();

        assert_eq!(collect(&doc, root, &[]), vec!["one", "two", "three", "four"]);
        assert_eq!(collect(&doc, b, &[]), vec!["two"]);
    }

    #[test]
    fn test_walker_skips_excluded_parents() {
        let mut doc = Document::new();
        let root = doc.root();
        let script = doc.append_element(root, "SCRIPT").unwrap();
        doc.append_text(script, "var price = '$5';").unwrap();
        doc.append_text(root, "visible").unwrap();

        let excluded = vec!["script".to_string()];
        assert_eq!(collect(&doc, root, &excluded), vec!["visible"]);
    }

    #[test]
    fn test_sibling_lookup_skips_blank_text() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.append_element(root, "span").unwrap();
        doc.append_text(root, "\n    ").unwrap();
        let second = doc.append_element(root, "span").unwrap();

        assert_eq!(next_sibling(&doc, first), Some(second));
        assert_eq!(prev_sibling(&doc, second), Some(first));
        assert_eq!(prev_sibling(&doc, first), None);
        assert_eq!(next_sibling(&doc, root), None);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut doc = Document::new();
        let root = doc.root();
        let span = doc.append_element(root, "span").unwrap();
        doc.append_text(span, "$").unwrap();
        doc.append_text(root, "5").unwrap();

        assert_eq!(text_content(&doc, root), "$5");
        assert_eq!(first_text_child(&doc, span).and_then(|id| doc.text(id)), Some("$"));
        assert_eq!(first_text_child(&doc, root), None);
    }
}
