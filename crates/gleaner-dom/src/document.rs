//! Parse results and the read-only node view handed to collaborators.

use crate::{Attributes, DomTree, NodeId, NodeType, PathKey};

/// Text extraction common to every node kind.
pub trait TextContent {
    /// Concatenated descendant text, fragments joined by a single space.
    ///
    /// Comments and raw script/style content are not part of the text.
    fn text_content(&self) -> String;
}

/// A finished tree: the arena, the chosen root and one path key per node.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    root: NodeId,
    paths: Vec<PathKey>,
}

impl Document {
    /// Assemble a document. `paths` is indexed by `NodeId`.
    #[must_use]
    pub fn new(tree: DomTree, root: NodeId, paths: Vec<PathKey>) -> Self {
        debug_assert_eq!(tree.len(), paths.len(), "one path key per node");
        Self { tree, root, paths }
    }

    /// The underlying arena.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The root node: the sole top-level element, or the synthetic document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// A view of the root node.
    #[must_use]
    pub const fn root_ref(&self) -> NodeRef<'_> {
        NodeRef {
            tree: &self.tree,
            id: self.root,
        }
    }

    /// A view of any node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.tree.get(id).map(|_| NodeRef {
            tree: &self.tree,
            id,
        })
    }

    /// Path key recorded for a node when it was created.
    #[must_use]
    pub fn path_key(&self, id: NodeId) -> Option<&PathKey> {
        self.paths.get(id.0)
    }

    /// All nodes with their path keys, in creation (document) order.
    pub fn path_keys(&self) -> impl Iterator<Item = (NodeId, &PathKey)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(index, key)| (NodeId(index), key))
    }

    /// First element (document order) with the given tag name.
    #[must_use]
    pub fn find_element(&self, tag_name: &str) -> Option<NodeRef<'_>> {
        self.tree
            .descendants(NodeId::ROOT)
            .find(|&id| {
                self.tree
                    .as_element(id)
                    .is_some_and(|e| e.tag_name == tag_name)
            })
            .map(|id| NodeRef {
                tree: &self.tree,
                id,
            })
    }
}

impl TextContent for Document {
    fn text_content(&self) -> String {
        NodeRef {
            tree: &self.tree,
            id: NodeId::ROOT,
        }
        .text_content()
    }
}

/// Borrowed, read-only view of one node.
///
/// This is the whole surface a DOM facade needs: name, attribute lookup,
/// ordered children and the parent back-reference.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// The node's arena index.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The node payload.
    #[must_use]
    pub fn node_type(&self) -> &'a NodeType {
        // NodeRef is only constructed for IDs present in the tree.
        &self.tree.nodes_slice()[self.id.0].node_type
    }

    /// Tag name for elements, `None` otherwise.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.tree.as_element(self.id).map(|e| e.tag_name.as_str())
    }

    /// Attributes for elements, `None` otherwise.
    #[must_use]
    pub fn attributes(&self) -> Option<&'a Attributes> {
        self.tree.as_element(self.id).map(|e| &e.attrs)
    }

    /// Attribute value by exact name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes().and_then(|attrs| attrs.get(name))
    }

    /// Parent node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| Self {
            tree: self.tree,
            id,
        })
    }

    /// Children in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        let tree = self.tree;
        tree.children(self.id)
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Element children only.
    pub fn element_children(self) -> impl Iterator<Item = NodeRef<'a>> {
        self.children().filter(|child| child.name().is_some())
    }
}

impl TextContent for NodeRef<'_> {
    fn text_content(&self) -> String {
        let tree = self.tree;
        let fragments: Vec<&str> = tree
            .descendants(self.id)
            .filter_map(|id| tree.as_text(id))
            .filter(|text| !text.is_empty())
            .collect();
        fragments.join(" ")
    }
}
