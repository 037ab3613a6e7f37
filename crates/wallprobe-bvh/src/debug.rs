//! Diagnostic output of hierarchy boxes.

use wallprobe_math::Point3;

use crate::tree::Tree;

/// Receiver of wireframe geometry for visual debugging.
pub trait PlotSink {
    /// Draw a named set of line segments.
    fn draw_wireframe(&mut self, name: &str, edges: &[(Point3, Point3)]);
}

/// Draw the boxes of the two children of the root as wireframes named
/// `bvh_left` and `bvh_right`. A tree whose root is a leaf draws the root
/// box as `bvh_root` instead.
pub fn dump_top_level_boxes<S: PlotSink + ?Sized>(tree: &Tree, sink: &mut S) {
    let Some(root) = tree.iter().next() else {
        return;
    };
    match root.children {
        Some((left, right)) => {
            sink.draw_wireframe("bvh_left", &left.wireframe_edges());
            sink.draw_wireframe("bvh_right", &right.wireframe_edges());
        }
        None => sink.draw_wireframe("bvh_root", &root.aabb.wireframe_edges()),
    }
}
