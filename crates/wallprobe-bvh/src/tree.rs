//! Immutable hierarchy of nested boxes stored as a flat node array.

use crate::aabb::Aabb3;
use crate::iter::TreeIter;

/// What a node holds besides its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node with indices of its two children.
    Interior {
        /// Left child index.
        left: usize,
        /// Right child index.
        right: usize,
    },
    /// Leaf node covering the primitive range `start..end`.
    Leaf {
        /// First primitive index.
        start: usize,
        /// One past the last primitive index.
        end: usize,
    },
}

/// A hierarchy node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Box enclosing everything below this node.
    pub aabb: Aabb3,
    /// Children or leaf range.
    pub kind: NodeKind,
}

impl Node {
    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Primitive range of a leaf.
    pub fn leaf_range(&self) -> Option<std::ops::Range<usize>> {
        match self.kind {
            NodeKind::Leaf { start, end } => Some(start..end),
            NodeKind::Interior { .. } => None,
        }
    }

    /// Child indices of an interior node.
    pub fn children(&self) -> Option<(usize, usize)> {
        match self.kind {
            NodeKind::Interior { left, right } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// Bounding volume hierarchy over an indexed primitive container.
///
/// The root is node `0`. Leaf ranges refer to primitive positions in the
/// container as left by the builder, so the container must not be reordered
/// after the build.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Wrap a non-empty node array whose root is at index 0.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Node `i`.
    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i]
    }

    /// All nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a built tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Box of the whole hierarchy.
    pub fn bounds(&self) -> Aabb3 {
        self.root().aabb
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of levels (a lone root leaf has depth 1).
    pub fn depth(&self) -> usize {
        self.iter().map(|v| v.depth + 1).max().unwrap_or(0)
    }

    /// Depth-first iterator starting at the root.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = crate::iter::NodeVisit;
    type IntoIter = TreeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
