//! Per-triangle thickness probing.
//!
//! For every triangle a ray is cast from its centroid, either along the
//! inward normal or both ways along a global direction, and the distance to
//! the nearest other facet becomes the triangle's thickness sample.

use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use wallprobe_bvh::{BvhError, FacetSet, Orientation, Shape, Triangulation};
use wallprobe_math::{triangle_centroid, triangle_normal, Dir3, Point3, TANGENCY_TOL};
use wallprobe_raytrace::{Ray, RayCaster, RayHit};

use crate::error::{Result, ThicknessError};
use crate::field::{AtomicScalarField, ScalarField};
use crate::report::{ProbeStats, ThicknessReport};
use crate::settings::{ProbeMethod, ThicknessSettings};

/// Input geometry of a probe.
#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    /// Raw triangulation; ids are triangle indices.
    Mesh {
        mesh: &'a Triangulation,
        orientation: Orientation,
    },
    /// Tessellated shape; ids are face indices.
    Shape(&'a Shape),
}

/// One triangle to probe, with the id its sample is stored under.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: usize,
    /// World-space vertices, or `None` if the triangle references missing
    /// nodes.
    tri: Option<[Point3; 3]>,
}

/// What probing one triangle produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Sample { id: usize, thickness: f64 },
    Degenerate,
    Tangential,
    Unresolved,
}

/// Wall thickness probe over a triangulated surface.
///
/// # Example
///
/// ```
/// use wallprobe_bvh::Triangulation;
/// use wallprobe_math::Point3;
/// use wallprobe_thickness::{ThicknessProbe, ThicknessSettings};
///
/// // Two facing unit triangles one unit apart, normals pointing away.
/// let mesh = Triangulation::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0),
///         Point3::new(1.0, 0.0, 1.0),
///         Point3::new(0.0, 1.0, 1.0),
///     ],
///     vec![[0, 2, 1], [3, 4, 5]],
/// );
///
/// let mut probe = ThicknessProbe::new(&mesh, ThicknessSettings::default());
/// probe.perform().unwrap();
/// assert!((probe.min_thickness().unwrap() - 1.0).abs() < 1e-12);
/// assert_eq!(probe.field().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ThicknessProbe<'a> {
    source: Source<'a>,
    settings: ThicknessSettings,
    field: ScalarField,
    min_thickness: Option<f64>,
    max_thickness: Option<f64>,
    stats: ProbeStats,
}

impl<'a> ThicknessProbe<'a> {
    /// Probe a raw triangulation; samples are keyed by triangle index.
    pub fn new(mesh: &'a Triangulation, settings: ThicknessSettings) -> Self {
        Self::with_source(
            Source::Mesh {
                mesh,
                orientation: Orientation::Forward,
            },
            settings,
        )
    }

    /// Probe a tessellated shape; samples are keyed by face index and a
    /// face keeps the largest sample of its triangles.
    pub fn for_shape(shape: &'a Shape, settings: ThicknessSettings) -> Self {
        Self::with_source(Source::Shape(shape), settings)
    }

    fn with_source(source: Source<'a>, settings: ThicknessSettings) -> Self {
        Self {
            source,
            settings,
            field: ScalarField::new(),
            min_thickness: None,
            max_thickness: None,
            stats: ProbeStats::default(),
        }
    }

    /// Set the winding orientation of a raw triangulation.
    ///
    /// Shapes carry per-face orientation and ignore this.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        if let Source::Mesh { mesh, .. } = self.source {
            self.source = Source::Mesh { mesh, orientation };
        }
        self
    }

    /// Settings in use.
    pub fn settings(&self) -> &ThicknessSettings {
        &self.settings
    }

    /// Run one probing pass, replacing any previous results.
    ///
    /// Fails for empty input, invalid settings and the sphere method.
    /// Triangles that cannot be probed are skipped and counted in
    /// [`ThicknessProbe::stats`].
    pub fn perform(&mut self) -> Result<()> {
        self.settings.validate()?;
        if self.settings.method == ProbeMethod::Sphere {
            error!("sphere-based thickness probing is not yet implemented");
            return Err(ThicknessError::UnsupportedMethod("sphere"));
        }

        self.field.clear();
        self.min_thickness = None;
        self.max_thickness = None;
        self.stats = ProbeStats::default();

        let mut facets = self.facets()?;
        let tree = self.settings.strategy.build(&mut facets, &self.settings.build);
        if tree.is_none() {
            debug!("No hierarchy built; every probe will miss");
        }

        let candidates = self.candidates();
        let direction = self.settings.probe_direction();

        info!(
            triangles = candidates.len(),
            facets = facets.len(),
            custom_direction = direction.is_some(),
            parallel = self.settings.parallel,
            "Starting wall thickness probe"
        );

        let outcomes = if self.settings.parallel {
            let shared = AtomicScalarField::new(self.id_bound());
            let outcomes: Vec<Outcome> = candidates
                .par_iter()
                .map_init(
                    || RayCaster::new(&facets, tree.as_ref()),
                    |caster, cand| {
                        let outcome = probe_triangle(caster, cand, direction.as_ref());
                        if let Outcome::Sample { id, thickness } = outcome {
                            shared.upsert_max(id, thickness);
                        }
                        outcome
                    },
                )
                .collect();
            self.field = shared.into_field();
            outcomes
        } else {
            let mut caster = RayCaster::new(&facets, tree.as_ref());
            let mut outcomes = Vec::with_capacity(candidates.len());
            for cand in &candidates {
                let outcome = probe_triangle(&mut caster, cand, direction.as_ref());
                if let Outcome::Sample { id, thickness } = outcome {
                    self.field.upsert_max(id, thickness);
                }
                outcomes.push(outcome);
            }
            outcomes
        };

        self.tally(&outcomes);

        match (self.min_thickness, self.max_thickness) {
            (Some(min), Some(max)) => info!(
                probed = self.stats.probed,
                unresolved = self.stats.unresolved,
                min_thickness = format!("{min:.3}"),
                max_thickness = format!("{max:.3}"),
                "Wall thickness probe complete"
            ),
            _ => warn!(
                triangles = self.stats.triangles,
                "Wall thickness probe produced no samples"
            ),
        }
        Ok(())
    }

    /// Per-id thickness of the last pass.
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    /// Smallest sample of the last pass.
    pub fn min_thickness(&self) -> Option<f64> {
        self.min_thickness
    }

    /// Largest sample of the last pass.
    pub fn max_thickness(&self) -> Option<f64> {
        self.max_thickness
    }

    /// Counts of the last pass.
    pub fn stats(&self) -> &ProbeStats {
        &self.stats
    }

    /// Snapshot of the last pass.
    pub fn report(&self) -> ThicknessReport {
        ThicknessReport {
            stats: self.stats,
            min_thickness: self.min_thickness,
            max_thickness: self.max_thickness,
            field: self.field.clone(),
        }
    }

    fn facets(&self) -> Result<FacetSet> {
        let facets = match self.source {
            Source::Mesh { mesh, orientation } => FacetSet::from_triangulation(mesh, orientation),
            Source::Shape(shape) => FacetSet::from_shape(shape),
        };
        facets.map_err(|e| match e {
            BvhError::EmptyInput(_) => ThicknessError::EmptyMesh,
            BvhError::InvalidParams(msg) => ThicknessError::InvalidSettings(msg),
        })
    }

    fn candidates(&self) -> Vec<Candidate> {
        match self.source {
            Source::Mesh { mesh, orientation } => (0..mesh.num_triangles())
                .map(|k| Candidate {
                    id: k,
                    tri: mesh.triangle(k, orientation),
                })
                .collect(),
            Source::Shape(shape) => shape
                .faces
                .iter()
                .enumerate()
                .filter_map(|(id, face)| Some((id, face.orientation, face.triangulation.as_ref()?)))
                .flat_map(|(id, orientation, mesh)| {
                    (0..mesh.num_triangles()).map(move |k| Candidate {
                        id,
                        tri: mesh.triangle(k, orientation),
                    })
                })
                .collect(),
        }
    }

    /// One past the largest id a sample can be stored under.
    fn id_bound(&self) -> usize {
        match self.source {
            Source::Mesh { mesh, .. } => mesh.num_triangles(),
            Source::Shape(shape) => shape.faces.len(),
        }
    }

    fn tally(&mut self, outcomes: &[Outcome]) {
        let mut stats = ProbeStats {
            triangles: outcomes.len(),
            ..Default::default()
        };
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;

        for outcome in outcomes {
            match *outcome {
                Outcome::Sample { thickness, .. } => {
                    stats.probed += 1;
                    min = Some(min.map_or(thickness, |m| m.min(thickness)));
                    max = Some(max.map_or(thickness, |m| m.max(thickness)));
                }
                Outcome::Degenerate => stats.degenerate += 1,
                Outcome::Tangential => stats.tangential += 1,
                Outcome::Unresolved => stats.unresolved += 1,
            }
        }

        debug!(
            degenerate = stats.degenerate,
            tangential = stats.tangential,
            "Skipped triangles"
        );
        self.stats = stats;
        self.min_thickness = min;
        self.max_thickness = max;
    }
}

/// Probe one triangle, excluding its own id from the ray queries.
fn probe_triangle(caster: &mut RayCaster<'_>, cand: &Candidate, direction: Option<&Dir3>) -> Outcome {
    let Some([p0, p1, p2]) = cand.tri else {
        return Outcome::Degenerate;
    };
    let Some(normal) = triangle_normal(&p0, &p1, &p2) else {
        return Outcome::Degenerate;
    };
    let centroid = triangle_centroid(&p0, &p1, &p2);
    let inward = -normal;

    caster.set_face_to_skip(cand.id);

    let hit = match direction {
        None => caster.query(&Ray::from_dir(centroid, inward)),
        Some(d) => {
            if d.dot(inward.as_ref()).abs() <= TANGENCY_TOL {
                return Outcome::Tangential;
            }
            let forward = caster.query(&Ray::from_dir(centroid, *d));
            let backward = caster.query(&Ray::from_dir(centroid, -*d));
            closer(&centroid, forward, backward)
        }
    };

    match hit {
        Some(hit) => Outcome::Sample {
            id: cand.id,
            thickness: (hit.point - centroid).norm(),
        },
        None => {
            warn!(triangle = cand.id, "cannot find intersected facet");
            Outcome::Unresolved
        }
    }
}

/// The hit nearer to `origin`; `forward` wins ties.
fn closer(origin: &Point3, forward: Option<RayHit>, backward: Option<RayHit>) -> Option<RayHit> {
    match (forward, backward) {
        (Some(f), Some(b)) => {
            if (b.point - *origin).norm() < (f.point - *origin).norm() {
                Some(b)
            } else {
                Some(f)
            }
        }
        (f, b) => f.or(b),
    }
}
