//! Valence-driven edge flipping.

use hashbrown::HashSet;
use mesh_dynamic::{DynamicMesh, FaceSet};
use tracing::debug;

use crate::batch::edge_key;

/// The two faces and opposite vertices around an interior edge.
///
/// `left` traverses the edge `e1 → e2` in its winding, `right` traverses
/// `e2 → e1`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeNeighborhood {
    pub left_face: u32,
    pub left_vertex: u32,
    pub right_face: u32,
    pub right_vertex: u32,
}

/// Find the faces incident to edge `(e1, e2)` and their opposite vertices.
///
/// Panics if the edge is not an interior manifold edge; calling this on a
/// non-edge is a programming error.
pub(crate) fn edge_neighborhood(mesh: &DynamicMesh, e1: u32, e2: u32) -> EdgeNeighborhood {
    let mut left = None;
    let mut right = None;

    for &f in mesh.adjacent_faces(e1) {
        let idx = mesh.vertex_indices(f);
        for k in 0..3 {
            let a = idx[k];
            let b = idx[(k + 1) % 3];
            let opposite = idx[(k + 2) % 3];
            if a == e1 && b == e2 {
                left = Some((f, opposite));
            } else if a == e2 && b == e1 {
                right = Some((f, opposite));
            }
        }
    }

    let (Some((left_face, left_vertex)), Some((right_face, right_vertex))) = (left, right) else {
        unreachable!("edge ({e1}, {e2}) is not an interior manifold edge");
    };
    EdgeNeighborhood {
        left_face,
        left_vertex,
        right_face,
        right_vertex,
    }
}

/// Flip edges around poles to pull valences toward 6.
///
/// Candidate edges are those incident to a vertex of the region with
/// valence above 6, each considered once. An edge `(e1, e2)` with opposite
/// vertices `(l, r)` is flipped iff both endpoint valences exceed 3 and the
/// flip strictly reduces the summed deviation from valence 6 (the flip
/// moves one face from each endpoint to each opposite vertex).
///
/// Returns the number of flips performed.
pub fn relax_edges(mesh: &mut DynamicMesh, faces: &FaceSet) -> usize {
    debug_assert!(!faces.has_uncommitted());

    let mut candidates: Vec<(u32, u32)> = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    for v in mesh.vertices_of(faces) {
        if mesh.valence(v) > 6 {
            for &f in mesh.adjacent_faces(v) {
                for u in mesh.vertex_indices(f) {
                    if u != v && seen.insert(edge_key(v, u)) {
                        candidates.push(edge_key(v, u));
                    }
                }
            }
        }
    }

    let mut flips = 0;
    for (e1, e2) in candidates {
        let nb = edge_neighborhood(mesh, e1, e2);

        let ve1 = mesh.valence(e1) as i64;
        let ve2 = mesh.valence(e2) as i64;
        let vl = mesh.valence(nb.left_vertex) as i64;
        let vr = mesh.valence(nb.right_vertex) as i64;

        let pre = (ve1 - 6).abs() + (ve2 - 6).abs() + (vl - 6).abs() + (vr - 6).abs();
        let post = (ve1 - 7).abs() + (ve2 - 7).abs() + (vl - 5).abs() + (vr - 5).abs();

        if ve1 > 3 && ve2 > 3 && post < pre {
            mesh.delete_face(nb.left_face);
            mesh.delete_face(nb.right_face);
            mesh.add_face(nb.left_vertex, e1, nb.right_vertex);
            mesh.add_face(nb.right_vertex, e2, nb.left_vertex);
            flips += 1;
        }
    }

    if flips > 0 {
        debug!(flips, "relaxed pole edges");
    }
    flips
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_dynamic::shapes::icosphere;
    use mesh_dynamic::{Point3, Vector3};

    #[test]
    fn neighborhood_orientation() {
        let mut mesh = DynamicMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        let l = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0), Vector3::z());
        let r = mesh.add_vertex(Point3::new(0.5, -1.0, 0.0), Vector3::z());
        let left = mesh.add_face(a, b, l);
        let right = mesh.add_face(b, a, r);

        let nb = edge_neighborhood(&mesh, a, b);
        assert_eq!(nb.left_face, left);
        assert_eq!(nb.left_vertex, l);
        assert_eq!(nb.right_face, right);
        assert_eq!(nb.right_vertex, r);

        // Swapping the query direction swaps the sides.
        let nb = edge_neighborhood(&mesh, b, a);
        assert_eq!(nb.left_face, right);
        assert_eq!(nb.left_vertex, r);
    }

    #[test]
    fn regular_region_performs_no_flips() {
        // Icosphere valences are 5 and 6: no poles, no candidates.
        let mut mesh = icosphere(1.0, 2);
        let mut faces = FaceSet::new();
        faces.extend(mesh.face_indices());
        faces.commit();

        assert_eq!(relax_edges(&mut mesh, &faces), 0);
        assert!(mesh.check_consistency());
    }

    /// An octahedron with three of the four bottom-apex faces split 1-to-3
    /// through their centroids: the apex reaches valence 7 and becomes a
    /// pole. Relaxation must flip at least one incident edge, pull the
    /// apex back toward valence 6, and keep the mesh manifold.
    #[test]
    fn pole_is_relaxed_by_flipping() {
        let mut mesh = DynamicMesh::new();
        let top = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0), Vector3::z());
        let bottom = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0), -Vector3::z());
        let px = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::x());
        let py = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::y());
        let nx = mesh.add_vertex(Point3::new(-1.0, 0.0, 0.0), -Vector3::x());
        let ny = mesh.add_vertex(Point3::new(0.0, -1.0, 0.0), -Vector3::y());

        mesh.add_face(top, px, py);
        mesh.add_face(top, py, nx);
        mesh.add_face(top, nx, ny);
        mesh.add_face(top, ny, px);
        let lower = [
            mesh.add_face(bottom, py, px),
            mesh.add_face(bottom, nx, py),
            mesh.add_face(bottom, ny, nx),
        ];
        mesh.add_face(bottom, px, ny);
        assert!(mesh.check_consistency());

        for f in lower {
            let [a, b, c] = mesh.vertex_indices(f);
            let centroid = Point3::from(
                (mesh.position(a).coords + mesh.position(b).coords + mesh.position(c).coords)
                    / 3.0,
            );
            let m = mesh.add_vertex(centroid, -Vector3::z());
            mesh.delete_face(f);
            mesh.add_face(a, b, m);
            mesh.add_face(b, c, m);
            mesh.add_face(c, a, m);
        }
        assert_eq!(mesh.valence(bottom), 7);
        assert!(mesh.check_consistency());

        let mut faces = FaceSet::new();
        faces.extend(mesh.face_indices());
        faces.commit();

        let flips = relax_edges(&mut mesh, &faces);
        assert!(flips >= 1);
        assert!(mesh.valence(bottom) <= 6);
        assert!(mesh.check_consistency());
    }
}
