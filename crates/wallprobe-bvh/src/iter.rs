//! Depth-first traversal of a [`Tree`].

use std::iter::FusedIterator;

use crate::aabb::Aabb3;
use crate::tree::{NodeKind, Tree};

/// One step of a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeVisit {
    /// Index of the node in [`Tree::nodes`].
    pub index: usize,
    /// Distance from the root (the root has depth 0).
    pub depth: usize,
    /// Box of the node.
    pub aabb: Aabb3,
    /// Children or leaf range.
    pub kind: NodeKind,
    /// Boxes of the left and right child of an interior node.
    pub children: Option<(Aabb3, Aabb3)>,
}

impl NodeVisit {
    /// Whether the visited node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Primitive range of a visited leaf.
    pub fn leaf_range(&self) -> Option<std::ops::Range<usize>> {
        match self.kind {
            NodeKind::Leaf { start, end } => Some(start..end),
            NodeKind::Interior { .. } => None,
        }
    }
}

/// Pre-order iterator: a node, then its left subtree, then its right.
#[derive(Debug, Clone)]
pub struct TreeIter<'a> {
    tree: &'a Tree,
    stack: Vec<(usize, usize)>,
}

impl<'a> TreeIter<'a> {
    /// Start a walk at the root of `tree`.
    pub fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::with_capacity(64);
        if !tree.is_empty() {
            stack.push((0, 0));
        }
        Self { tree, stack }
    }

    /// Skip the subtree below the node returned last.
    ///
    /// Has no effect after a leaf.
    pub fn skip_children(&mut self, last: &NodeVisit) {
        if let NodeKind::Interior { left, right } = last.kind {
            while let Some(&(top, _)) = self.stack.last() {
                if top == left || top == right {
                    self.stack.pop();
                } else {
                    break;
                }
            }
        }
    }
}

impl Iterator for TreeIter<'_> {
    type Item = NodeVisit;

    fn next(&mut self) -> Option<NodeVisit> {
        let (index, depth) = self.stack.pop()?;
        let node = self.tree.node(index);

        let children = match node.kind {
            NodeKind::Interior { left, right } => {
                // Right first so that left is popped next.
                self.stack.push((right, depth + 1));
                self.stack.push((left, depth + 1));
                Some((self.tree.node(left).aabb, self.tree.node(right).aabb))
            }
            NodeKind::Leaf { .. } => None,
        };

        Some(NodeVisit {
            index,
            depth,
            aabb: node.aabb,
            kind: node.kind,
            children,
        })
    }
}

impl FusedIterator for TreeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildParams, BuildStrategy};
    use crate::facet::FacetSet;
    use crate::input::{Orientation, Triangulation};
    use wallprobe_math::Point3;

    fn strip(n: usize) -> FacetSet {
        let mut nodes = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..n {
            let x = i as f64 * 2.0;
            let base = nodes.len();
            nodes.push(Point3::new(x, 0.0, 0.0));
            nodes.push(Point3::new(x + 1.0, 0.0, 0.0));
            nodes.push(Point3::new(x, 1.0, 0.0));
            triangles.push([base, base + 1, base + 2]);
        }
        FacetSet::from_triangulation(&Triangulation::new(nodes, triangles), Orientation::Forward).unwrap()
    }

    #[test]
    fn test_visits_every_node_once_in_preorder() {
        let mut facets = strip(20);
        let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::new(1, 2)).unwrap();

        let visits: Vec<NodeVisit> = tree.iter().collect();
        assert_eq!(visits.len(), tree.len());
        assert_eq!(visits[0].index, 0);
        assert_eq!(visits[0].depth, 0);

        let mut indices: Vec<usize> = visits.iter().map(|v| v.index).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), tree.len());

        // Pre-order: an interior node is followed directly by its left child.
        for (i, v) in visits.iter().enumerate() {
            if let NodeKind::Interior { left, .. } = v.kind {
                assert_eq!(visits[i + 1].index, left);
                assert_eq!(visits[i + 1].depth, v.depth + 1);
            }
        }
    }

    #[test]
    fn test_leaves_come_in_primitive_order() {
        let mut facets = strip(32);
        let tree = BuildStrategy::Linear.build(&mut facets, &BuildParams::default()).unwrap();
        let starts: Vec<usize> = tree.iter().filter_map(|v| v.leaf_range()).map(|r| r.start).collect();
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_children_boxes_reported() {
        let mut facets = strip(8);
        let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::new(1, 1)).unwrap();
        let root = tree.iter().next().unwrap();
        let (l, r) = root.children.unwrap();
        let (li, ri) = tree.root().children().unwrap();
        assert_eq!(l, tree.node(li).aabb);
        assert_eq!(r, tree.node(ri).aabb);
    }

    #[test]
    fn test_skip_children() {
        let mut facets = strip(8);
        let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::new(1, 1)).unwrap();
        let mut iter = tree.iter();
        let root = iter.next().unwrap();
        iter.skip_children(&root);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_depth_of_single_leaf() {
        let mut facets = strip(1);
        let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::default()).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.iter().count(), 1);
    }
}
