//! Edge collapsing and valence-3 vertex removal.

use mesh_dynamic::{DynamicMesh, FaceSet};
use nalgebra::Vector3;
use tracing::debug;

use crate::batch::NewFaces;
use crate::relax::edge_neighborhood;

/// Remove a valence-3 vertex by deleting its three incident faces and
/// closing the hole with the single triangle spanned by its neighbors,
/// wound to match the outgoing winding around the removed vertex.
///
/// Rejected (returns `false`) when any neighbor has valence 3 itself,
/// since removing the vertex would drive that neighbor to valence 2.
///
/// The replacement face is staged into `faces`.
pub fn delete_valence3_vertex(mesh: &mut DynamicMesh, v: u32, faces: &mut FaceSet) -> bool {
    assert!(!mesh.is_free_vertex(v));
    assert_eq!(mesh.valence(v), 3);

    let adj = mesh.adjacent_faces(v);
    let [f1, f2, f3] = [adj[0], adj[1], adj[2]];

    // Neighbors in cyclic order after `v` in the first face.
    let [a1, a2, a3] = mesh.vertex_indices(f1);
    let (n1, n2) = if v == a1 {
        (a2, a3)
    } else if v == a2 {
        (a3, a1)
    } else {
        (a1, a2)
    };

    // The third neighbor is whichever vertex of the second face is new.
    let [b1, b2, b3] = mesh.vertex_indices(f2);
    let n3 = if b1 != v && b1 != n1 && b1 != n2 {
        b1
    } else if b2 != v && b2 != n1 && b2 != n2 {
        b2
    } else {
        b3
    };
    debug_assert!(n3 != v && n3 != n1 && n3 != n2);

    if mesh.valence(n1) > 3 && mesh.valence(n2) > 3 && mesh.valence(n3) > 3 {
        mesh.delete_face(f1);
        mesh.delete_face(f2);
        mesh.delete_face(f3);
        mesh.delete_vertex(v);

        faces.insert(mesh.add_face(n1, n2, n3));
        true
    } else {
        false
    }
}

/// Number of vertices adjacent to both `i1` and `i2`.
///
/// For a collapsible interior edge this is exactly 2 (the two link
/// vertices); any other count signals a configuration where collapsing
/// would create a non-manifold fan.
fn num_common_adjacent_vertices(mesh: &DynamicMesh, i1: u32, i2: u32) -> usize {
    let successor = |i: u32, f: u32| -> u32 {
        let [a1, a2, a3] = mesh.vertex_indices(f);
        if i == a1 {
            a2
        } else if i == a2 {
            a3
        } else {
            a1
        }
    };

    let mut n = 0;
    for &f1 in mesh.adjacent_faces(i1) {
        let s = successor(i1, f1);
        if s != i2 {
            for &f2 in mesh.adjacent_faces(i2) {
                if s == successor(i2, f2) {
                    n += 1;
                }
            }
        }
    }
    n
}

/// Collapse the edge `(i1, i2)` to a single vertex at its midpoint.
///
/// Rejections (returns `false`, mesh untouched):
/// - the two link vertices coincide,
/// - either link vertex has valence 3 (it would drop to valence 2),
/// - the endpoints share more or fewer than 2 neighbors (non-manifold fan).
///
/// A valence-3 endpoint is removed by [`delete_valence3_vertex`] instead,
/// with the surviving endpoint moved to the midpoint. Otherwise both fans
/// are re-emitted around a fresh midpoint vertex in one batch, and the
/// endpoints are deleted; the new vertex has valence `v1 + v2 - 4`. Its
/// normal is zero until the finalize pass recomputes it.
pub fn collapse_edge(mesh: &mut DynamicMesh, i1: u32, i2: u32, faces: &mut FaceSet) -> bool {
    let v1 = mesh.valence(i1);
    let v2 = mesh.valence(i2);
    debug_assert!(v1 >= 3);
    debug_assert!(v2 >= 3);
    debug_assert!(
        mesh.adjacent_faces(i1)
            .iter()
            .any(|&f| mesh.vertex_indices(f).contains(&i2)),
        "collapse of a non-edge"
    );

    let new_pos = mesh.position(i1) + (mesh.position(i2) - mesh.position(i1)) * 0.5;

    if v1 == 3 {
        if delete_valence3_vertex(mesh, i1, faces) {
            mesh.set_position(i2, new_pos);
            return true;
        }
        return false;
    }
    if v2 == 3 {
        if delete_valence3_vertex(mesh, i2, faces) {
            mesh.set_position(i1, new_pos);
            return true;
        }
        return false;
    }

    let nb = edge_neighborhood(mesh, i1, i2);
    debug_assert!(mesh.valence(nb.left_vertex) >= 3);
    debug_assert!(mesh.valence(nb.right_vertex) >= 3);

    if nb.left_vertex == nb.right_vertex {
        return false;
    }
    if mesh.valence(nb.left_vertex) == 3 || mesh.valence(nb.right_vertex) == 3 {
        return false;
    }
    if num_common_adjacent_vertices(mesh, i1, i2) != 2 {
        return false;
    }

    let new_vertex = mesh.add_vertex(new_pos, Vector3::zeros());

    let mut batch = NewFaces::default();
    for (from, other) in [(i1, i2), (i2, i1)] {
        for &f in mesh.adjacent_faces(from) {
            let [a1, a2, a3] = mesh.vertex_indices(f);
            // Re-emit the face with the endpoint replaced, preserving the
            // cyclic order; the two link faces contain both endpoints and
            // are only deleted.
            let keep1 = a1 != from && a1 != other;
            let keep2 = a2 != from && a2 != other;
            let keep3 = a3 != from && a3 != other;

            if keep1 && keep2 {
                batch.add_face(new_vertex, a1, a2);
            } else if keep2 && keep3 {
                batch.add_face(new_vertex, a2, a3);
            } else if keep3 && keep1 {
                batch.add_face(new_vertex, a3, a1);
            }
            batch.delete_face(f);
        }
    }
    let applied = batch.apply_to_mesh(mesh, faces);

    debug_assert!(mesh.adjacent_faces(i1).is_empty());
    debug_assert!(mesh.adjacent_faces(i2).is_empty());
    mesh.delete_vertex(i1);
    mesh.delete_vertex(i2);

    if applied {
        debug_assert!(mesh.valence(new_vertex) == v1 + v2 - 4);
    } else {
        // The deletions emptied the mesh, so the re-fan was skipped and
        // the midpoint vertex never gained a face.
        mesh.delete_vertex(new_vertex);
    }

    true
}

/// Repeatedly scan the face set, collapsing the first edge of each face
/// that satisfies `pred`. Faces created by a collapse are staged and
/// scanned in the next round; the loop ends when a round stages nothing.
/// Finally the set is filtered down to live faces and committed.
///
/// Returns the number of collapses performed.
pub fn collapse_edges<P>(mesh: &mut DynamicMesh, pred: P, faces: &mut FaceSet) -> usize
where
    P: Fn(&DynamicMesh, u32, u32) -> bool,
{
    let mut collapsed = 0;
    let mut current = FaceSet::new();
    current.extend(faces.iter());

    loop {
        faces.extend(current.uncommitted().iter().copied());
        current.commit();

        let round: Vec<u32> = current.indices().to_vec();
        for f in round {
            if mesh.is_free_face(f) {
                continue;
            }
            let [i1, i2, i3] = mesh.vertex_indices(f);

            if pred(mesh, i1, i2) {
                collapsed += usize::from(collapse_edge(mesh, i1, i2, &mut current));
            } else if pred(mesh, i1, i3) {
                collapsed += usize::from(collapse_edge(mesh, i1, i3, &mut current));
            } else if pred(mesh, i2, i3) {
                collapsed += usize::from(collapse_edge(mesh, i2, i3, &mut current));
            }
        }

        if !current.has_uncommitted() {
            break;
        }
    }

    faces.filter(|f| !mesh.is_free_face(f));
    faces.commit();

    if collapsed > 0 {
        debug!(collapsed, remaining = mesh.num_faces(), "collapsed edges");
    }
    collapsed
}

/// Collapse every edge shorter than `max_sqr` (squared length threshold).
pub fn collapse_edges_by_length(mesh: &mut DynamicMesh, max_sqr: f64, faces: &mut FaceSet) -> usize {
    collapse_edges(
        mesh,
        |mesh, i1, i2| {
            debug_assert!(!mesh.is_free_vertex(i1));
            debug_assert!(!mesh.is_free_vertex(i2));
            (mesh.position(i1) - mesh.position(i2)).norm_squared() < max_sqr
        },
        faces,
    )
}

/// Collapse unconditionally until nothing more can collapse.
pub fn collapse_all_edges(mesh: &mut DynamicMesh, faces: &mut FaceSet) -> usize {
    collapse_edges(mesh, |_, _, _| true, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_dynamic::shapes::icosphere;
    use mesh_dynamic::Point3;

    /// Octahedron: valence 4 everywhere, 8 faces.
    fn octahedron() -> DynamicMesh {
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
        mesh.add_face(bottom, py, px);
        mesh.add_face(bottom, nx, py);
        mesh.add_face(bottom, ny, nx);
        mesh.add_face(bottom, px, ny);
        mesh
    }

    #[test]
    fn common_neighbor_count_on_regular_edge() {
        let mesh = octahedron();
        // Edge (top, px): link vertices are py and ny.
        assert_eq!(num_common_adjacent_vertices(&mesh, 0, 2), 2);
    }

    #[test]
    fn octahedron_edge_collapse_merges_fans() {
        // Edge (top, px): link vertices py and ny have valence 4 and the
        // endpoints share exactly two neighbors, so the collapse runs.
        // 6 incident faces are deleted, 4 re-emitted around the midpoint.
        let mut mesh = octahedron();
        let mut faces = FaceSet::new();
        assert!(collapse_edge(&mut mesh, 0, 2, &mut faces));
        assert!(mesh.check_consistency());
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_vertices(), 5);
        assert!(mesh.is_free_vertex(0));
        assert!(mesh.is_free_vertex(2));
    }

    #[test]
    fn tetrahedron_collapse_is_rejected() {
        // Every tetrahedron vertex has valence 3; collapsing any edge would
        // need a valence-3 removal whose neighbors all have valence 3 too.
        let mut mesh = DynamicMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
        let d = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0), Vector3::z());
        mesh.add_face(a, c, b);
        mesh.add_face(a, b, d);
        mesh.add_face(b, c, d);
        mesh.add_face(a, d, c);

        let mut faces = FaceSet::new();
        assert!(!collapse_edge(&mut mesh, a, b, &mut faces));
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.check_consistency());
    }

    #[test]
    fn valence3_removal_closes_the_hole() {
        // Octahedron with one face split 1-to-3: the centroid has
        // valence 3 and its neighbors have valence 5, so removal fires.
        let mut mesh = octahedron();
        let f = 0;
        let [a, b, c] = mesh.vertex_indices(f);
        let centroid = Point3::from(
            (mesh.position(a).coords + mesh.position(b).coords + mesh.position(c).coords) / 3.0,
        );
        let m = mesh.add_vertex(centroid, Vector3::z());
        mesh.delete_face(f);
        mesh.add_face(a, b, m);
        mesh.add_face(b, c, m);
        mesh.add_face(c, a, m);
        assert!(mesh.check_consistency());

        let mut faces = FaceSet::new();
        assert!(delete_valence3_vertex(&mut mesh, m, &mut faces));
        assert!(mesh.is_free_vertex(m));
        assert_eq!(mesh.num_faces(), 8);
        assert!(mesh.check_consistency());
        assert_eq!(faces.uncommitted().len(), 1);
    }

    #[test]
    fn collapse_by_length_ignores_long_edges() {
        let mut mesh = icosphere(1.0, 1);
        let mut faces = FaceSet::new();
        faces.extend(mesh.face_indices());
        faces.commit();

        // Subdiv-1 icosphere edges are ~0.3-0.55: a tiny threshold
        // collapses nothing.
        let n = collapse_edges_by_length(&mut mesh, 1e-6, &mut faces);
        assert_eq!(n, 0);
        assert_eq!(mesh.num_faces(), 80);
        assert!(mesh.check_consistency());
    }

    #[test]
    fn collapse_all_empties_or_minimizes() {
        let mut mesh = icosphere(1.0, 1);
        let mut faces = FaceSet::new();
        faces.extend(mesh.face_indices());
        faces.commit();

        let n = collapse_all_edges(&mut mesh, &mut faces);
        assert!(n > 0);
        // Everything that remains is live, and the set mirrors that.
        for f in faces.iter() {
            assert!(!mesh.is_free_face(f));
        }
        assert!(mesh.num_faces() < 80);
        if !mesh.is_empty() {
            assert!(mesh.check_consistency());
        }
    }

    #[test]
    fn collapse_moves_survivor_to_midpoint_on_valence3_path() {
        // Split an octahedron face 1-to-3, then collapse the edge from the
        // centroid to an original vertex: the centroid (valence 3) is
        // removed and the survivor moves to the edge midpoint.
        let mut mesh = octahedron();
        let [a, b, c] = mesh.vertex_indices(0);
        let centroid = Point3::from(
            (mesh.position(a).coords + mesh.position(b).coords + mesh.position(c).coords) / 3.0,
        );
        let m = mesh.add_vertex(centroid, Vector3::z());
        mesh.delete_face(0);
        mesh.add_face(a, b, m);
        mesh.add_face(b, c, m);
        mesh.add_face(c, a, m);

        let before = mesh.position(a);
        let expected = before + (centroid - before) * 0.5;

        let mut faces = FaceSet::new();
        assert!(collapse_edge(&mut mesh, m, a, &mut faces));
        assert!(mesh.is_free_vertex(m));
        assert!((mesh.position(a) - expected).norm() < 1e-12);
        assert!(mesh.check_consistency());
    }
}
