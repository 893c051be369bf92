//! Markup tree for the Gleaner parser.
//!
//! This crate provides the arena-based tree the tree builder fills in, plus
//! the small read-only surface downstream tools (a DOM facade, path-based
//! content heuristics) consume.
//!
//! # Design
//!
//! All nodes live in one `Vec` owned by [`DomTree`]; parent, child and sibling
//! relationships are [`NodeId`] indices into it. Nothing holds a reference
//! into another node, so there are no ownership cycles and the whole tree is
//! dropped in one go when the parse result is dropped.

mod attributes;
mod document;
mod path;

pub use attributes::Attributes;
pub use document::{Document, NodeRef, TextContent};
pub use path::{PathKey, PathSegment};

use serde::Serialize;

/// A type-safe index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// Which raw-text element a [`NodeType::Raw`] node was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    /// `<script>` content.
    Script,
    /// `<style>` content.
    Style,
}

impl RawKind {
    /// The element name this kind is captured from.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

/// A node slot in the arena: its payload plus index links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its data.
    pub node_type: NodeType,
    /// Parent node, `None` for the document node and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// Next sibling under the same parent.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling under the same parent.
    pub prev_sibling: Option<NodeId>,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The synthetic root every parse starts from.
    Document,
    /// A tag with attributes and children.
    Element(ElementData),
    /// Hyper-trimmed character data.
    Text(String),
    /// Comment (or retained declaration) text.
    Comment(String),
    /// Verbatim script/style content.
    Raw(RawData),
}

impl NodeType {
    /// Character data carried directly by this node, if any.
    #[must_use]
    pub fn own_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Comment(text) => Some(text),
            Self::Raw(raw) => Some(&raw.text),
            Self::Document | Self::Element(_) => None,
        }
    }

    /// Short label used by debug printers and path keys of non-element nodes.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Document => "#document",
            Self::Element(_) => "#element",
            Self::Text(_) => "#text",
            Self::Comment(_) => "#comment",
            Self::Raw(RawData { kind, .. }) => match kind {
                RawKind::Script => "#script",
                RawKind::Style => "#style",
            },
        }
    }
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name (lowercased in HTML mode, verbatim in XML mode).
    pub tag_name: String,
    /// Attributes in source order.
    pub attrs: Attributes,
}

impl ElementData {
    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }
}

/// Raw-text element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawData {
    /// Script or style.
    pub kind: RawKind,
    /// Content between the start tag and the closing marker, verbatim.
    pub text: String,
}

/// Arena-based tree with O(1) node access and traversal.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes, indexed by `NodeId`. The document node is at index 0.
    nodes: Vec<Node>,
}

impl DomTree {
    /// A tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        };
        Self {
            nodes: vec![document],
        }
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The node stored under `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// All node slots, indexed by `NodeId`.
    #[must_use]
    pub fn nodes_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes, including the document node.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree starts with its document node.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new, detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Append `child` as the last child of `parent`, updating all links.
    ///
    /// Both IDs must come from this tree; `child` must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.nodes[child.0].parent.is_none(),
            "append_child called with an attached node"
        );
        if let Some(&previous) = self.nodes[parent.0].children.last() {
            self.nodes[previous.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(previous);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Parent link; `None` for the document node and detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Children in insertion order; empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// First child, if any.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Last child, if any.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Following sibling under the same parent.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.next_sibling)
    }

    /// Preceding sibling under the same parent.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.prev_sibling)
    }

    /// Whether `ancestor` lies on the parent chain of `descendant`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Parent chain of `id`, nearest first, ending at the document node.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over a subtree in document order (pre-order), starting at `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            pending: vec![id],
        }
    }

    /// Tag name and attributes of an element node.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|node| match &node.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Character data of a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|node| match &node.node_type {
            NodeType::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Element children of the document node, in order.
    pub fn top_level_elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .filter(|&id| self.as_element(id).is_some())
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// See [`DomTree::ancestors`].
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    pending: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.pending.pop()?;
        self.pending
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
