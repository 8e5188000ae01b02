//! The brush contract and a concrete carve brush.

use mesh_dynamic::{DynamicMesh, FaceSet, Sphere};
use nalgebra::Point3;

use crate::error::SculptResult;
use crate::params::BrushParams;

/// A sculpt brush as the remesh driver consumes it.
///
/// The brush provides a spherical region of influence, its parameters, and
/// a displacement hook applied once per stroke after the region has been
/// remeshed. The mesh is passed to the kernel explicitly rather than owned
/// by the brush, so a brush can be reused across meshes and the mesh keeps
/// a single mutable owner.
pub trait Brush {
    /// Region of influence in world space.
    fn sphere(&self) -> Sphere;

    /// Mode and thresholds.
    fn params(&self) -> &BrushParams;

    /// Displace vertices of the face region. Called once per stroke, after
    /// refinement and before the degenerate-edge cleanup; vertex normals
    /// are recomputed by the driver afterwards.
    fn displace(&self, mesh: &mut DynamicMesh, faces: &FaceSet);
}

/// The committed set of live faces touching the sphere.
///
/// Linear scan over the face table; a host with a spatial index can build
/// the set itself and bypass this.
#[must_use]
pub fn affected_faces(mesh: &DynamicMesh, sphere: &Sphere) -> FaceSet {
    let mut faces = FaceSet::new();
    for f in mesh.face_indices() {
        if sphere.intersects_triangle(&mesh.triangle(f)) {
            faces.insert(f);
        }
    }
    faces.commit();
    faces
}

/// A carving brush: vertices move along their normals with a smooth radial
/// falloff, raising (or with negative intensity, denting) the surface
/// under the brush.
#[derive(Debug, Clone)]
pub struct CarveBrush {
    center: Point3<f64>,
    params: BrushParams,
}

impl CarveBrush {
    /// Create a carve brush at `center`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters fail validation.
    pub fn new(center: Point3<f64>, params: BrushParams) -> SculptResult<Self> {
        params.validate()?;
        Ok(Self { center, params })
    }

    /// Displacement magnitude at distance `d` from the center.
    ///
    /// `w(x) = (1 - x²)³` over the normalized distance: unit at the
    /// center, zero at the rim with a flat landing, so the stroke blends
    /// into the untouched surface without a crease.
    fn falloff(&self, d: f64) -> f64 {
        let x = d / self.params.radius;
        if x >= 1.0 {
            return 0.0;
        }
        let w = (1.0 - x * x).powi(3);
        self.params.intensity * self.params.radius * w
    }
}

impl Brush for CarveBrush {
    fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.params.radius)
    }

    fn params(&self) -> &BrushParams {
        &self.params
    }

    fn displace(&self, mesh: &mut DynamicMesh, faces: &FaceSet) {
        let mut displaced: Vec<(u32, Point3<f64>)> = Vec::new();
        for v in mesh.vertices_of(faces) {
            let p = mesh.position(v);
            let offset = self.falloff((p - self.center).norm());
            if offset != 0.0 {
                displaced.push((v, p + mesh.vertex_normal(v) * offset));
            }
        }
        for (v, p) in displaced {
            mesh.set_position(v, p);
        }
    }
}
