//! Input models: raw triangulations and tessellated shapes.
//!
//! Both are consumed once when a [`FacetSet`](crate::FacetSet) is built.
//! Triangulating faces is the caller's business; a [`Shape`] arrives with
//! one triangulation per face.

use serde::{Deserialize, Serialize};
use wallprobe_math::{Point3, Transform};

use crate::aabb::Aabb3;

/// Orientation flag of a face or of a whole triangulation.
///
/// A reversed orientation swaps the first and last vertex of every
/// triangle so that normals computed from the winding keep pointing
/// outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Winding is used as stored.
    #[default]
    Forward,
    /// Winding is flipped.
    Reversed,
}

impl Orientation {
    /// Apply this orientation to a triangle's vertices.
    #[inline]
    pub fn apply<T: Copy>(self, tri: [T; 3]) -> [T; 3] {
        match self {
            Orientation::Forward => tri,
            Orientation::Reversed => [tri[2], tri[1], tri[0]],
        }
    }
}

/// An indexed triangulation with an optional placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Triangulation {
    /// Node positions in local coordinates.
    pub nodes: Vec<Point3>,
    /// Triangles as triples of node indices.
    pub triangles: Vec<[usize; 3]>,
    /// Placement applied to every node.
    #[serde(default)]
    pub placement: Option<Transform>,
}

impl Triangulation {
    /// Create a triangulation without placement.
    pub fn new(nodes: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            nodes,
            triangles,
            placement: None,
        }
    }

    /// Attach a placement transform.
    pub fn with_placement(mut self, placement: Transform) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// True if there is nothing to triangulate.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.triangles.is_empty()
    }

    /// Node `i` in world coordinates.
    pub fn world_node(&self, i: usize) -> Option<Point3> {
        let p = self.nodes.get(i)?;
        Some(match &self.placement {
            Some(t) => t.apply_point(p),
            None => *p,
        })
    }

    /// World-space vertices of triangle `k` with `orientation` applied.
    ///
    /// Returns `None` if `k` or any of its node indices is out of range.
    pub fn triangle(&self, k: usize, orientation: Orientation) -> Option<[Point3; 3]> {
        let [a, b, c] = orientation.apply(*self.triangles.get(k)?);
        Some([self.world_node(a)?, self.world_node(b)?, self.world_node(c)?])
    }

    /// World-space box of all nodes, whether referenced or not.
    pub fn bounds(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.nodes.len() {
            if let Some(p) = self.world_node(i) {
                aabb.include_point(&p);
            }
        }
        aabb
    }
}

/// One face of a tessellated boundary model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeFace {
    /// Triangulation of the face, if it has been tessellated.
    pub triangulation: Option<Triangulation>,
    /// Orientation of the face within its shell.
    #[serde(default)]
    pub orientation: Orientation,
}

impl ShapeFace {
    /// A face with the given triangulation and orientation.
    pub fn new(triangulation: Triangulation, orientation: Orientation) -> Self {
        Self {
            triangulation: Some(triangulation),
            orientation,
        }
    }
}

/// A boundary model exploded to tessellated faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shape {
    /// Faces in their explored order; a face's index is its owner id.
    pub faces: Vec<ShapeFace>,
}

impl Shape {
    /// Create a shape from its faces.
    pub fn new(faces: Vec<ShapeFace>) -> Self {
        Self { faces }
    }

    /// Number of candidate triangles over all tessellated faces.
    pub fn num_triangles(&self) -> usize {
        self.faces
            .iter()
            .filter_map(|f| f.triangulation.as_ref())
            .map(Triangulation::num_triangles)
            .sum()
    }

    /// World-space box of every face's nodes.
    pub fn bounds(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for tri in self.faces.iter().filter_map(|f| f.triangulation.as_ref()) {
            aabb.merge(&tri.bounds());
        }
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Triangulation {
        Triangulation::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_orientation_swaps_first_and_last() {
        assert_eq!(Orientation::Forward.apply([1, 2, 3]), [1, 2, 3]);
        assert_eq!(Orientation::Reversed.apply([1, 2, 3]), [3, 2, 1]);
    }

    #[test]
    fn test_triangle_applies_placement() {
        let mesh = quad().with_placement(Transform::translation(0.0, 0.0, 5.0));
        let [a, _, _] = mesh.triangle(0, Orientation::Forward).unwrap();
        assert_eq!(a, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(mesh.bounds().min.z, 5.0);
    }

    #[test]
    fn test_triangle_out_of_range() {
        let mut mesh = quad();
        mesh.triangles.push([0, 1, 99]);
        assert!(mesh.triangle(2, Orientation::Forward).is_none());
        assert!(mesh.triangle(3, Orientation::Forward).is_none());
    }

    #[test]
    fn test_shape_counts_only_tessellated_faces() {
        let shape = Shape::new(vec![
            ShapeFace::new(quad(), Orientation::Forward),
            ShapeFace::default(),
            ShapeFace::new(quad(), Orientation::Reversed),
        ]);
        assert_eq!(shape.num_triangles(), 4);
    }

    #[test]
    fn test_triangulation_json() {
        let json = r#"{
            "nodes": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            "triangles": [[0, 1, 2]]
        }"#;
        let mesh: Triangulation = serde_json::from_str(json).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
        assert!(mesh.placement.is_none());
    }
}
