//! Tangent-plane smoothing with surface reprojection.

use mesh_dynamic::{DynamicMesh, FaceSet};
use nalgebra::Point3;

use crate::BARYCENTRIC_EPSILON;

/// Smooth every vertex of the face region.
///
/// For each vertex the one-ring centroid is projected onto the tangent
/// plane at the vertex: plain Laplacian averaging would shrink the
/// surface, while the tangential component alone equalizes the
/// triangulation.
/// The tangential position is then reprojected onto the closest incident
/// face that contains it barycentrically, keeping vertices on the
/// piecewise-linear surface; if no incident face accepts it the tangential
/// position is used as-is.
///
/// All positions are computed against the original geometry and written in
/// a second pass.
pub fn smooth(mesh: &mut DynamicMesh, faces: &FaceSet) {
    let lo = -BARYCENTRIC_EPSILON;
    let hi = 1.0 + BARYCENTRIC_EPSILON;

    let mut new_positions: Vec<(u32, Point3<f64>)> = Vec::new();

    for v in mesh.vertices_of(faces) {
        let average = mesh.average_position(v);
        let normal = mesh.vertex_normal(v);
        let delta = average - mesh.position(v);
        let tangential = average - normal * normal.dot(&delta);

        let mut best: Option<(f64, Point3<f64>)> = None;

        for &f in mesh.adjacent_faces(v) {
            let [i1, i2, i3] = mesh.vertex_indices(f);
            let p1 = mesh.position(i1);
            let p2 = mesh.position(i2);
            let p3 = mesh.position(i3);

            let u = p2 - p1;
            let w = p3 - p1;
            let q = tangential - p1;
            let n = u.cross(&w);
            let nn = n.dot(&n);

            // Degenerate faces produce non-finite coordinates and fail the
            // range checks below.
            let b1 = u.cross(&q).dot(&n) / nn;
            let b2 = q.cross(&w).dot(&n) / nn;
            let b3 = 1.0 - b1 - b2;

            if lo < b1 && b1 < hi && lo < b2 && b2 < hi && lo < b3 && b3 < hi {
                let projected =
                    Point3::from(p1.coords * b3 + p2.coords * b2 + p3.coords * b1);
                let distance = (tangential - projected).norm_squared();
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, projected));
                }
            }
        }

        new_positions.push((v, best.map_or(tangential, |(_, p)| p)));
    }

    for (v, p) in new_positions {
        mesh.set_position(v, p);
    }
}
