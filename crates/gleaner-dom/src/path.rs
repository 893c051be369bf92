//! Path keys: structural addresses of nodes.
//!
//! A path key is the chain of open tags at the moment a node was created,
//! each paired with its index among its parent's element children. Two nodes
//! from different pages with the same path key sit at the same structural
//! position, which is what template and boilerplate heuristics key on.

use std::fmt;

use serde::Serialize;

/// One step of a [`PathKey`]: a tag name and its per-parent sibling index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PathSegment {
    /// Tag name as stored on the element (lowercased in HTML mode).
    pub name: String,
    /// Zero-based index among the parent's element children.
    pub index: usize,
}

impl PathSegment {
    /// Create a segment.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Ancestor chain plus sibling positions identifying a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PathKey {
    segments: Vec<PathSegment>,
}

impl PathKey {
    /// The empty path (the synthetic document root).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from its segments, outermost first.
    #[must_use]
    pub const fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Segments from outermost ancestor to the node itself.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Path of a child of this node.
    #[must_use]
    pub fn child(&self, name: &str, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::new(name, index));
        Self { segments }
    }

    /// Path of the parent, or `None` for the root path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Length of the longest shared prefix with `other`.
    #[must_use]
    pub fn common_prefix_len(&self, other: &Self) -> usize {
        self.segments
            .iter()
            .zip(&other.segments)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True if `self` is a strict ancestor path of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.depth() < other.depth() && self.common_prefix_len(other) == self.depth()
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}[{}]", segment.name, segment.index)?;
        }
        Ok(())
    }
}
