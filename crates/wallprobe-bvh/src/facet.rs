//! Valid triangles and the container the hierarchy is built over.

use tracing::debug;
use wallprobe_math::{axis_coord, triangle_centroid, triangle_normal, Dir3, Point3};

use crate::aabb::Aabb3;
use crate::build::PrimitiveAccess;
use crate::error::{BvhError, Result};
use crate::input::{Orientation, Shape, Triangulation};

/// A non-degenerate triangle with its cached unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    /// First vertex.
    pub p0: Point3,
    /// Second vertex.
    pub p1: Point3,
    /// Third vertex.
    pub p2: Point3,
    /// Unit normal following the winding `p0 -> p1 -> p2`.
    pub normal: Dir3,
    /// Owning triangle or face id; `None` when there is no owner.
    pub owner: Option<usize>,
}

impl Facet {
    /// Create a facet, or `None` if the triangle is degenerate.
    ///
    /// A triangle is degenerate when an edge from `p0` or the cross product
    /// of those edges has a squared length below
    /// [`DEGENERACY_SQ_TOL`](wallprobe_math::DEGENERACY_SQ_TOL).
    pub fn new(p0: Point3, p1: Point3, p2: Point3, owner: Option<usize>) -> Option<Self> {
        let normal = triangle_normal(&p0, &p1, &p2)?;
        Some(Self {
            p0,
            p1,
            p2,
            normal,
            owner,
        })
    }

    /// The three vertices.
    #[inline]
    pub fn vertices(&self) -> [Point3; 3] {
        [self.p0, self.p1, self.p2]
    }

    /// Tight box around the three vertices.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_points(&[self.p0, self.p1, self.p2])
    }

    /// Mean of the three vertices.
    pub fn centroid(&self) -> Point3 {
        triangle_centroid(&self.p0, &self.p1, &self.p2)
    }
}

/// Ordered collection of valid facets.
///
/// The order is not an identity: building a hierarchy reorders facets with
/// [`FacetSet::swap`]. Use [`Facet::owner`] to map back to input triangles.
#[derive(Debug, Clone)]
pub struct FacetSet {
    facets: Vec<Facet>,
    bounding_diagonal: f64,
}

impl FacetSet {
    /// Build facets from a raw triangulation.
    ///
    /// The owner of each facet is the index of its triangle in `mesh`.
    /// Degenerate or out-of-range triangles are skipped.
    pub fn from_triangulation(mesh: &Triangulation, orientation: Orientation) -> Result<Self> {
        if mesh.nodes.is_empty() {
            return Err(BvhError::EmptyInput("triangulation has no nodes"));
        }
        if mesh.triangles.is_empty() {
            return Err(BvhError::EmptyInput("triangulation has no triangles"));
        }

        let mut facets = Vec::with_capacity(mesh.num_triangles());
        let skipped = push_triangles(&mut facets, mesh, orientation, Some);

        debug!(
            candidates = mesh.num_triangles(),
            facets = facets.len(),
            skipped,
            "Built facets from triangulation"
        );

        Ok(Self {
            facets,
            bounding_diagonal: mesh.bounds().diagonal(),
        })
    }

    /// Build facets from a tessellated boundary model.
    ///
    /// Each face's orientation decides whether its triangles are flipped.
    /// The owner of each facet is the index of its face in `shape`. Faces
    /// without a triangulation and degenerate triangles are skipped.
    pub fn from_shape(shape: &Shape) -> Result<Self> {
        if shape.faces.is_empty() {
            return Err(BvhError::EmptyInput("shape has no faces"));
        }

        let mut facets = Vec::with_capacity(shape.num_triangles());
        let mut skipped = 0;
        for (face_index, face) in shape.faces.iter().enumerate() {
            let Some(mesh) = &face.triangulation else {
                debug!(face = face_index, "Face has no triangulation");
                continue;
            };
            skipped += push_triangles(&mut facets, mesh, face.orientation, |_| Some(face_index));
        }

        debug!(
            faces = shape.faces.len(),
            candidates = shape.num_triangles(),
            facets = facets.len(),
            skipped,
            "Built facets from shape"
        );

        Ok(Self {
            facets,
            bounding_diagonal: shape.bounds().diagonal(),
        })
    }

    /// Wrap already validated facets.
    pub fn from_facets(facets: Vec<Facet>) -> Result<Self> {
        if facets.is_empty() {
            return Err(BvhError::EmptyInput("no facets"));
        }
        let mut bounds = Aabb3::empty();
        for f in &facets {
            bounds.merge(&f.aabb());
        }
        Ok(Self {
            facets,
            bounding_diagonal: bounds.diagonal(),
        })
    }

    /// Number of facets.
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// True if every candidate triangle was degenerate.
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Diagonal of the box around the full input geometry.
    pub fn bounding_diagonal(&self) -> f64 {
        self.bounding_diagonal
    }

    /// Facet `i`.
    pub fn facet(&self, i: usize) -> &Facet {
        &self.facets[i]
    }

    /// The three vertices of facet `i`.
    pub fn vertices(&self, i: usize) -> [Point3; 3] {
        self.facets[i].vertices()
    }

    /// Tight box of facet `i`.
    pub fn aabb(&self, i: usize) -> Aabb3 {
        self.facets[i].aabb()
    }

    /// Mean of facet `i`'s vertex coordinates on `axis`.
    pub fn centroid(&self, i: usize, axis: usize) -> f64 {
        let f = &self.facets[i];
        (axis_coord(&f.p0, axis) + axis_coord(&f.p1, axis) + axis_coord(&f.p2, axis)) / 3.0
    }

    /// Exchange facets `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.facets.swap(i, j);
    }

    /// Iterate over facets in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Facet> {
        self.facets.iter()
    }

    /// Append a facet. Invalidates any hierarchy built over this set.
    pub fn push(&mut self, facet: Facet) {
        self.facets.push(facet);
    }
}

impl PrimitiveAccess for FacetSet {
    fn len(&self) -> usize {
        self.facets.len()
    }

    fn aabb(&self, i: usize) -> Aabb3 {
        FacetSet::aabb(self, i)
    }

    fn centroid(&self, i: usize, axis: usize) -> f64 {
        FacetSet::centroid(self, i, axis)
    }

    fn swap(&mut self, i: usize, j: usize) {
        FacetSet::swap(self, i, j);
    }
}

impl<'a> IntoIterator for &'a FacetSet {
    type Item = &'a Facet;
    type IntoIter = std::slice::Iter<'a, Facet>;

    fn into_iter(self) -> Self::IntoIter {
        self.facets.iter()
    }
}

/// Append the valid triangles of `mesh`, returning how many were skipped.
fn push_triangles(
    facets: &mut Vec<Facet>,
    mesh: &Triangulation,
    orientation: Orientation,
    owner_of: impl Fn(usize) -> Option<usize>,
) -> usize {
    let mut skipped = 0;
    for k in 0..mesh.num_triangles() {
        let facet = mesh
            .triangle(k, orientation)
            .and_then(|[p0, p1, p2]| Facet::new(p0, p1, p2, owner_of(k)));
        match facet {
            Some(f) => facets.push(f),
            None => skipped += 1,
        }
    }
    skipped
}
