//! The remesh driver: stroke application and global passes.

use mesh_dynamic::{DynamicMesh, FaceSet};
use tracing::debug;

use crate::batch::NewVertices;
use crate::brush::{affected_faces, Brush};
use crate::collapse::{collapse_all_edges, collapse_edges_by_length};
use crate::domain::{extend_and_filter_domain, extend_domain, extend_domain_by_poles};
use crate::error::SculptResult;
use crate::relax::relax_edges;
use crate::result::SculptStats;
use crate::smooth::smooth;
use crate::split::{split_edges, triangulate};
use crate::MIN_EDGE_LENGTH;

/// Recompute vertex normals over the region and refresh the cached normals
/// of its faces.
pub fn finalize(mesh: &mut DynamicMesh, faces: &FaceSet) {
    for v in mesh.vertices_of(faces) {
        mesh.update_vertex_normal(v);
    }
    for f in faces.iter() {
        if !mesh.is_free_face(f) {
            mesh.realign_face(f);
        }
    }
}

/// Apply one brush stroke.
///
/// In reduce mode, edges shorter than the regional average scaled by the
/// brush intensity are collapsed, then the surroundings are smoothed. A
/// stroke that empties the mesh resets it and returns.
///
/// In refine mode the region is repeatedly re-seeded from the brush sphere
/// and split until no edge in it exceeds the subdivision threshold, with
/// relaxation and smoothing keeping the triangulation isotropic; the loop
/// runs while the face set is non-empty and the previous pass inserted
/// vertices. The brush displacement is applied afterwards, followed by a
/// degenerate-edge cleanup.
///
/// # Errors
///
/// Returns an error if the brush parameters fail validation. The mesh is
/// untouched in that case.
pub fn sculpt<B: Brush>(mesh: &mut DynamicMesh, brush: &B) -> SculptResult<SculptStats> {
    brush.params().validate()?;

    let mut stats = SculptStats::default();
    let sphere = brush.sphere();
    let mut faces = affected_faces(mesh, &sphere);
    if faces.is_empty() {
        return Ok(stats);
    }

    if brush.params().reduce {
        let max_sqr = mesh.average_edge_length_sqr(&faces) * brush.params().intensity;
        stats.collapses += collapse_edges_by_length(mesh, max_sqr, &mut faces);

        if mesh.is_empty() {
            mesh.reset();
            debug!("reduce stroke emptied the mesh");
            return Ok(stats);
        }

        extend_domain(mesh, &mut faces, 1);
        smooth(mesh, &faces);
        finalize(mesh, &faces);
        debug_assert!(mesh.check_consistency());
    } else {
        let mut new_vertices = NewVertices::default();
        loop {
            stats.passes += 1;
            new_vertices.clear();

            extend_and_filter_domain(mesh, &sphere, &mut faces, 1);
            extend_domain_by_poles(mesh, &mut faces);

            let max_length = brush.params().subdiv_threshold.max(2.0 * MIN_EDGE_LENGTH);
            split_edges(mesh, &mut new_vertices, max_length, &mut faces);
            stats.splits += new_vertices.len();

            if !new_vertices.is_empty() {
                triangulate(mesh, &new_vertices, &mut faces);
            }

            extend_domain(mesh, &mut faces, 1);
            stats.flips += relax_edges(mesh, &faces);
            smooth(mesh, &faces);
            finalize(mesh, &faces);

            debug!(
                pass = stats.passes,
                midpoints = new_vertices.len(),
                region = faces.len(),
                "refine pass"
            );

            if faces.is_empty() || new_vertices.is_empty() {
                break;
            }
        }

        let mut faces = affected_faces(mesh, &sphere);
        brush.displace(mesh, &faces);

        stats.collapses +=
            collapse_edges_by_length(mesh, MIN_EDGE_LENGTH * MIN_EDGE_LENGTH, &mut faces);
        finalize(mesh, &faces);
    }

    debug!(%stats, "stroke finished");
    Ok(stats)
}

/// One global relax → smooth → finalize pass over the whole mesh.
pub fn smooth_mesh(mesh: &mut DynamicMesh) -> SculptStats {
    let mut faces = FaceSet::new();
    faces.extend(mesh.face_indices());
    faces.commit();

    let flips = relax_edges(mesh, &faces);
    smooth(mesh, &faces);
    finalize(mesh, &faces);
    SculptStats {
        passes: 1,
        flips,
        ..SculptStats::default()
    }
}

/// Delete a face region by collapsing it away: collapse everything in the
/// set, then clean up degenerate edges. Returns whether any collapse
/// occurred.
pub fn delete_faces(mesh: &mut DynamicMesh, faces: &mut FaceSet) -> bool {
    let mut collapsed = collapse_all_edges(mesh, faces) > 0;
    collapsed |=
        collapse_edges_by_length(mesh, MIN_EDGE_LENGTH * MIN_EDGE_LENGTH, faces) > 0;
    finalize(mesh, faces);
    collapsed
}

/// Collapse every edge of the mesh shorter than the minimum edge length.
/// Returns whether any collapse occurred; a second call returns `false`.
pub fn collapse_degenerated_edges(mesh: &mut DynamicMesh) -> bool {
    let mut faces = FaceSet::new();
    faces.extend(mesh.face_indices());
    faces.commit();

    let collapsed =
        collapse_edges_by_length(mesh, MIN_EDGE_LENGTH * MIN_EDGE_LENGTH, &mut faces) > 0;
    finalize(mesh, &faces);
    collapsed
}
