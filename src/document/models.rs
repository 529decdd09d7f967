//! Core data structures for the hosted document tree
//!
//! The document is an arena of nodes addressed by `NodeId`. The hosting
//! environment builds and edits it through the public builders below; while
//! observation is on, every host edit is journaled as a `MutationRecord`.
//! The price engine never creates or removes nodes and rewrites text through
//! a crate-private path that is never journaled. Nodes written that way stay
//! marked as engine output until the host sets their text again.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element { tag: String },
    Text { value: String },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A change made by the host, as reported to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// The value of a text node changed
    CharacterData { target: NodeId },
    /// Nodes were inserted under `target`
    ChildList { target: NodeId, added: Vec<NodeId> },
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    observing: bool,
    records: Vec<MutationRecord>,
    engine_written: HashSet<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document whose root is a `body` element
    pub fn new() -> Self {
        Document {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: "body".to_string(),
                },
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            observing: false,
            records: Vec::new(),
            engine_written: HashSet::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tag of an element node, `None` for text nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    /// Value of a text node, `None` for elements
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text { value } => Some(value),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    /// Append a new element under `parent`. Returns `None` if `parent` is not an element.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.append(
            parent,
            NodeKind::Element {
                tag: tag.to_string(),
            },
        )
    }

    /// Append a new text node under `parent`. Returns `None` if `parent` is not an element.
    pub fn append_text(&mut self, parent: NodeId, value: &str) -> Option<NodeId> {
        self.append(
            parent,
            NodeKind::Text {
                value: value.to_string(),
            },
        )
    }

    /// Host-side text edit. Returns `false` if `id` is not a text node.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> bool {
        if !self.write_text(id, value) {
            return false;
        }
        self.engine_written.remove(&id);
        if self.observing {
            self.records
                .push(MutationRecord::CharacterData { target: id });
        }
        true
    }

    /// Engine-side text edit; never journaled so rewrites cannot re-trigger scans.
    pub(crate) fn rewrite_text(&mut self, id: NodeId, value: &str) -> bool {
        if !self.write_text(id, value) {
            return false;
        }
        self.engine_written.insert(id);
        true
    }

    /// Whether the current text of `id` was produced by the engine
    pub fn is_engine_written(&self, id: NodeId) -> bool {
        self.engine_written.contains(&id)
    }

    /// Start journaling host edits
    pub fn observe(&mut self) {
        self.observing = true;
    }

    /// Stop journaling host edits and drop anything not yet taken
    pub fn disconnect(&mut self) {
        self.observing = false;
        self.records.clear();
    }

    pub fn is_observed(&self) -> bool {
        self.observing
    }

    /// Drain the journaled edits in the order they happened
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.tag(parent)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);

        if self.observing {
            self.records.push(MutationRecord::ChildList {
                target: parent,
                added: vec![id],
            });
        }
        Some(id)
    }

    fn write_text(&mut self, id: NodeId, new_value: &str) -> bool {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Text { value }) => {
                if value.as_str() != new_value {
                    *value = new_value.to_string();
                }
                true
            }
            _ => false,
        }
    }
}
