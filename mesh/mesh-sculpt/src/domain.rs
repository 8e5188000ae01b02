//! Region expansion over the face adjacency graph.

use hashbrown::HashSet;
use mesh_dynamic::{DynamicMesh, FaceSet, Sphere};

/// Grow the committed set by `n_rings` full one-ring expansions: every face
/// sharing a vertex with a committed face is added. Each ring is committed
/// before the next starts.
pub fn extend_domain(mesh: &DynamicMesh, faces: &mut FaceSet, n_rings: u32) {
    debug_assert!(!faces.has_uncommitted());

    for _ in 0..n_rings {
        let committed: Vec<u32> = faces.indices().to_vec();
        for f in committed {
            if mesh.is_free_face(f) {
                continue;
            }
            for v in mesh.vertex_indices(f) {
                for &a in mesh.adjacent_faces(v) {
                    if !faces.contains(a) {
                        faces.insert(a);
                    }
                }
            }
        }
        faces.commit();
    }
}

/// Restrict the committed set to faces touching the sphere, then grow
/// `n_rings` partial expansions seeded only from the *frontier*: the
/// retained faces that are not fully contained in the sphere.
///
/// Growing from the frontier rather than the whole region keeps repeated
/// refine passes from re-expanding the settled interior.
pub fn extend_and_filter_domain(
    mesh: &DynamicMesh,
    sphere: &Sphere,
    faces: &mut FaceSet,
    n_rings: u32,
) {
    debug_assert!(!faces.has_uncommitted());

    let mut frontier: HashSet<u32> = HashSet::new();
    faces.filter(|i| {
        let triangle = mesh.triangle(i);
        if !sphere.intersects_triangle(&triangle) {
            return false;
        }
        if !sphere.contains_triangle(&triangle) {
            frontier.insert(i);
        }
        true
    });

    for _ in 0..n_rings {
        let mut extended_frontier: HashSet<u32> = HashSet::new();

        for &f in &frontier {
            for v in mesh.vertex_indices(f) {
                for &a in mesh.adjacent_faces(v) {
                    if !faces.contains(a) {
                        faces.insert(a);
                        extended_frontier.insert(a);
                    }
                }
            }
        }
        faces.commit();
        frontier = extended_frontier;
    }
}

/// Add every face incident to a pole (a vertex with valence above 6) of
/// the current region. One ring, one commit.
pub fn extend_domain_by_poles(mesh: &DynamicMesh, faces: &mut FaceSet) {
    debug_assert!(!faces.has_uncommitted());

    for v in mesh.vertices_of(faces) {
        if mesh.valence(v) > 6 {
            for &a in mesh.adjacent_faces(v) {
                if !faces.contains(a) {
                    faces.insert(a);
                }
            }
        }
    }
    faces.commit();
}
