use std::sync::Arc;

use gleaner_common::warning::warn_once;
use gleaner_dom::{
    Attributes, Document, DomTree, ElementData, NodeId, NodeType, PathKey, RawData, RawKind,
};

use crate::error::{IssueKind, ParseIssue};
use crate::options::ParseOptions;
use crate::tag_stack::{TagStack, TagStackEntry};
use crate::tokenizer::Token;

/// Builds a tree from tokens, driving a [`TagStack`] for recovery.
///
/// Every node gets a path key when it is created: elements take the stack
/// path after their push, other nodes extend the current element's path
/// with their label and position among its children.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: DomTree,
    paths: Vec<PathKey>,
    stack: TagStack,
    keep_empty_text: bool,
    issues: Vec<ParseIssue>,
    position: u64,
}

impl TreeBuilder {
    /// A builder configured from `options`. HTML mode folds name case and
    /// validates nesting.
    #[must_use]
    pub fn new(options: &ParseOptions) -> Self {
        let rules = Arc::clone(&options.rules);
        let stack = if options.html_mode {
            TagStack::validating(rules, true)
        } else {
            TagStack::new(rules, false)
        };
        Self {
            tree: DomTree::new(),
            paths: vec![PathKey::root()],
            stack,
            keep_empty_text: options.keep_empty_text,
            issues: Vec::new(),
            position: 0,
        }
    }

    /// Byte position recorded on issues raised by later tokens.
    pub const fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    /// The open-element stack.
    #[must_use]
    pub const fn stack(&self) -> &TagStack {
        &self.stack
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Node that receives the next child: the innermost open element, or
    /// the document node.
    #[must_use]
    pub fn current_node(&self) -> NodeId {
        self.stack
            .current()
            .and_then(|entry| entry.node)
            .unwrap_or(NodeId::ROOT)
    }

    /// Apply one token.
    pub fn process_token(&mut self, token: Token) {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.insert_element(name, attributes, self_closing),
            Token::EndTag { name } => self.close_element(&name),
            Token::Text { text } => {
                if !text.is_empty() || self.keep_empty_text {
                    self.append_leaf(NodeType::Text(text));
                }
            }
            Token::Comment { text } => self.append_leaf(NodeType::Comment(text)),
            Token::RawBlock { kind, text } => self.append_raw(kind, text),
            Token::EndOfStream => {
                let _ = self.stack.close_all();
            }
        }
    }

    /// Close whatever is still open and hand over the document and the
    /// recovery issues.
    ///
    /// The root is the top-level element when it has no siblings other
    /// than comments; otherwise the document node.
    #[must_use]
    pub fn finish(mut self) -> (Document, Vec<ParseIssue>) {
        let _ = self.stack.close_all();
        let root = {
            let tree = &self.tree;
            let mut top_level = tree
                .children(NodeId::ROOT)
                .iter()
                .copied()
                .filter(|&id| {
                    !matches!(
                        tree.get(id).map(|node| &node.node_type),
                        Some(NodeType::Comment(_))
                    )
                });
            match (top_level.next(), top_level.next()) {
                (Some(only), None) if tree.as_element(only).is_some() => only,
                _ => NodeId::ROOT,
            }
        };
        (Document::new(self.tree, root, self.paths), self.issues)
    }

    fn insert_element(&mut self, name: String, attrs: Attributes, self_closing: bool) {
        let node = self.tree.alloc(NodeType::Element(ElementData {
            tag_name: name.clone(),
            attrs,
        }));
        let outcome = self.stack.push_tag(&name, Some(node));
        self.report_implicit_closes(&outcome.implicitly_closed, &name);
        if !outcome.repaired.is_empty() {
            let closed: Vec<&str> = outcome.repaired.iter().map(|e| e.name.as_str()).collect();
            self.record(
                IssueKind::IllegalNesting,
                format!("<{name}> may not nest here; closed {}", closed.join(", ")),
            );
        }

        let parent = self
            .stack
            .depth()
            .checked_sub(2)
            .and_then(|depth| self.stack.entry_at(depth))
            .and_then(|entry| entry.node)
            .unwrap_or(NodeId::ROOT);
        self.tree.append_child(parent, node);
        debug_assert_eq!(node.0, self.paths.len());
        self.paths.push(self.stack.path_key());

        if self_closing {
            let _ = self.stack.pop_current();
        }
    }

    fn close_element(&mut self, name: &str) {
        let closed = self.stack.pop_tag(name);
        let Some((_matched, implicit)) = closed.split_last() else {
            warn_once("Tree builder", "ignoring end tags with no open element");
            self.record(
                IssueKind::UnmatchedEndTag,
                format!("</{name}> has no open element"),
            );
            return;
        };
        self.report_implicit_closes(implicit, name);
    }

    fn report_implicit_closes(&mut self, closed: &[TagStackEntry], by: &str) {
        for entry in closed {
            if !self.stack.rules().has_optional_end_tag(&entry.name) {
                self.record(
                    IssueKind::ImplicitlyClosed,
                    format!("<{}> closed implicitly by <{by}>", entry.name),
                );
            }
        }
    }

    fn append_raw(&mut self, kind: RawKind, text: String) {
        self.append_leaf(NodeType::Raw(RawData { kind, text }));
    }

    fn append_leaf(&mut self, node_type: NodeType) {
        let parent = self.current_node();
        let index = self.tree.children(parent).len();
        let path = self.stack.path_key().child(node_type.label(), index);
        let node = self.tree.alloc(node_type);
        self.tree.append_child(parent, node);
        self.paths.push(path);
    }

    fn record(&mut self, kind: IssueKind, message: String) {
        self.issues
            .push(ParseIssue::warning(kind, message, self.position));
    }
}
