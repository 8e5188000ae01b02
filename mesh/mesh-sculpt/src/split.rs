//! Edge splitting and midpoint triangulation.

use mesh_dynamic::{DynamicMesh, FaceSet};
use nalgebra::Point3;
use tracing::debug;

use crate::batch::{NewFaces, NewVertices};
use crate::COLINEAR_EPSILON;

/// Compute the position of the vertex inserted on edge `(i1, i2)`.
///
/// When the endpoint normals are colinear the edge is locally flat and the
/// midpoint is used. Otherwise the two tangent planes at the endpoints are
/// intersected with an auxiliary plane through `p1` orthogonal to both,
/// which recovers the local curvature; the result is blended
/// `0.25·p1 + 0.5·p3 + 0.25·p2` so a single noisy normal cannot throw the
/// vertex far off the edge.
#[must_use]
pub fn split_position(mesh: &DynamicMesh, i1: u32, i2: u32) -> Point3<f64> {
    let p1 = mesh.position(i1);
    let n1 = mesh.vertex_normal(i1);
    let p2 = mesh.position(i2);
    let n2 = mesh.vertex_normal(i2);

    let cross = n1.cross(&n2);
    if 1.0 - n1.dot(&n2).abs() < COLINEAR_EPSILON || cross.norm_squared() < f64::EPSILON {
        Point3::from((p1.coords + p2.coords) * 0.5)
    } else {
        let n3 = cross.normalize();
        let d1 = p1.coords.dot(&n1);
        let d2 = p2.coords.dot(&n2);
        let d3 = p1.coords.dot(&n3);
        let p3 = (n2.cross(&n3) * d1 + n3.cross(&n1) * d2 + n1.cross(&n2) * d3)
            / n1.dot(&n2.cross(&n3));

        Point3::from(p1.coords * 0.25 + p3 * 0.5 + p2.coords * 0.25)
    }
}

/// Split every edge of the committed faces whose squared length exceeds
/// `max_length²`, inserting a midpoint vertex per edge and registering it
/// in `new_vertices`. A face stays in the set iff one of its edge visits
/// performed a split; [`triangulate`] then rewrites the retained faces and
/// their neighbors.
pub fn split_edges(
    mesh: &mut DynamicMesh,
    new_vertices: &mut NewVertices,
    max_length: f64,
    faces: &mut FaceSet,
) {
    debug_assert!(!faces.has_uncommitted());
    let max_sqr = max_length * max_length;

    faces.filter(|f| {
        let [i1, i2, i3] = mesh.vertex_indices(f);
        let mut was_split = false;

        for (a, b) in [(i1, i2), (i1, i3), (i2, i3)] {
            if new_vertices.contains(a, b) {
                continue;
            }
            if (mesh.position(a) - mesh.position(b)).norm_squared() > max_sqr {
                let normal = (mesh.vertex_normal(a) + mesh.vertex_normal(b))
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(|| mesh.vertex_normal(a));
                let position = split_position(mesh, a, b);
                let v = mesh.add_vertex(position, normal);
                new_vertices.insert(a, b, v);
                was_split = true;
            }
        }
        was_split
    });
}

/// Rewrite every face holding registered midpoints into a fan.
///
/// Visits the one-ring closure of the committed set so faces outside the
/// set that share a split edge are rewritten too; otherwise the midpoint
/// would dangle on a three-face edge. With two midpoints the remaining
/// quad is split toward the lower-valence corner, which bounds
/// maximum-valence growth and makes identical inputs produce identical
/// fans. Deletions and additions are applied as one batch; the surplus
/// additions are staged into the set and committed here.
pub fn triangulate(mesh: &mut DynamicMesh, new_vertices: &NewVertices, faces: &mut FaceSet) {
    debug_assert!(!faces.has_uncommitted());

    let mut batch = NewFaces::default();

    mesh.for_each_face_ext(faces, |mesh, f| {
        let [i1, i2, i3] = mesh.vertex_indices(f);

        let m12 = new_vertices.get(i1, i2);
        let m13 = new_vertices.get(i1, i3);
        let m23 = new_vertices.get(i2, i3);

        let v1 = mesh.valence(i1);
        let v2 = mesh.valence(i2);
        let v3 = mesh.valence(i3);

        match (m12, m13, m23) {
            (None, None, None) => {}

            // One midpoint: two triangles.
            (Some(m), None, None) => {
                batch.delete_face(f);
                batch.add_face(i1, m, i3);
                batch.add_face(i3, m, i2);
            }
            (None, Some(m), None) => {
                batch.delete_face(f);
                batch.add_face(i3, m, i2);
                batch.add_face(i2, m, i1);
            }
            (None, None, Some(m)) => {
                batch.delete_face(f);
                batch.add_face(i2, m, i1);
                batch.add_face(i1, m, i3);
            }

            // Two midpoints: a corner triangle plus a quad, split toward
            // the lower-valence corner.
            (Some(m12), Some(m13), None) => {
                batch.delete_face(f);
                batch.add_face(m12, m13, i1);
                if v2 < v3 {
                    batch.add_face(i2, i3, m13);
                    batch.add_face(i2, m13, m12);
                } else {
                    batch.add_face(i3, m12, i2);
                    batch.add_face(i3, m13, m12);
                }
            }
            (Some(m12), None, Some(m23)) => {
                batch.delete_face(f);
                batch.add_face(m23, m12, i2);
                if v1 < v3 {
                    batch.add_face(i1, m23, i3);
                    batch.add_face(i1, m12, m23);
                } else {
                    batch.add_face(i3, i1, m12);
                    batch.add_face(i3, m12, m23);
                }
            }
            (None, Some(m13), Some(m23)) => {
                batch.delete_face(f);
                batch.add_face(m13, m23, i3);
                if v1 < v2 {
                    batch.add_face(i1, i2, m23);
                    batch.add_face(i1, m23, m13);
                } else {
                    batch.add_face(i2, m13, i1);
                    batch.add_face(i2, m23, m13);
                }
            }

            // Three midpoints: the regular 1-to-4 subdivision.
            (Some(m12), Some(m13), Some(m23)) => {
                batch.delete_face(f);
                batch.add_face(m12, m23, m13);
                batch.add_face(i1, m12, m13);
                batch.add_face(i2, m23, m12);
                batch.add_face(i3, m13, m23);
            }
        }
    });

    let increasing = batch.apply_to_mesh(mesh, faces);
    debug_assert!(increasing);
    debug!(
        midpoints = new_vertices.len(),
        staged = faces.uncommitted().len(),
        "triangulated split region"
    );

    faces.commit();
}
