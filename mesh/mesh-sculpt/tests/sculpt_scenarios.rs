//! End-to-end stroke scenarios.
//!
//! Each test drives a public entry point on a freshly built shape and
//! checks the observable contract: face counts, edge-length bounds,
//! manifoldness, and untouched-region stability.

use approx::assert_abs_diff_eq;
use mesh_dynamic::shapes::{icosphere, triangulated_grid};
use mesh_dynamic::{DynamicMesh, FaceSet, Point3, Sphere};
use mesh_sculpt::{
    collapse_degenerated_edges, relax_edges, sculpt, Brush, BrushParams, CarveBrush,
    MIN_EDGE_LENGTH,
};

/// A brush that remeshes its region but displaces nothing.
struct NullBrush {
    center: Point3<f64>,
    params: BrushParams,
}

impl Brush for NullBrush {
    fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.params.radius)
    }

    fn params(&self) -> &BrushParams {
        &self.params
    }

    fn displace(&self, _mesh: &mut DynamicMesh, _faces: &FaceSet) {}
}

/// Longest edge among faces fully contained in the sphere.
fn max_contained_edge(mesh: &DynamicMesh, sphere: &Sphere) -> f64 {
    let mut max_sqr: f64 = 0.0;
    for f in mesh.face_indices() {
        let tri = mesh.triangle(f);
        if sphere.contains_triangle(&tri) {
            max_sqr = max_sqr.max(tri.max_edge_length_sqr());
        }
    }
    max_sqr.sqrt()
}

fn shortest_edge(mesh: &DynamicMesh) -> f64 {
    let mut min_sqr = f64::INFINITY;
    for f in mesh.face_indices() {
        let tri = mesh.triangle(f);
        let [a, b, c] = tri.edge_lengths_sqr();
        min_sqr = min_sqr.min(a).min(b).min(c);
    }
    min_sqr.sqrt()
}

// S1: refine stroke on an icosphere, brush centered at a vertex.
#[test]
fn refine_subdivides_the_brush_region() {
    let mut mesh = icosphere(1.0, 2);
    let faces_before = mesh.num_faces();
    let center = mesh.position(0);

    let params = BrushParams::refining(0.05)
        .with_radius(0.3)
        .with_intensity(0.1);
    let brush = CarveBrush::new(center, params).unwrap();

    let stats = sculpt(&mut mesh, &brush).unwrap();

    assert!(stats.splits > 0);
    assert!(mesh.num_faces() > faces_before);
    assert!(mesh.check_consistency());

    // Every edge fully inside the brush region respects the threshold,
    // with slack for the smoothing and displacement that follow the last
    // split pass.
    let longest = max_contained_edge(&mesh, &brush.sphere());
    assert!(
        longest <= 0.05 * 1.5,
        "edge of length {longest} survived refinement"
    );
    // The lower bound holds everywhere.
    assert!(shortest_edge(&mesh) >= MIN_EDGE_LENGTH);
}

// S2: reduce stroke on the same sphere. The collapse threshold is the
// regional mean squared edge length scaled by the intensity; on a
// near-uniform icosphere only intensity 1.0 puts edges below it.
#[test]
fn reduce_coarsens_the_brush_region() {
    let mut mesh = icosphere(1.0, 2);
    let faces_before = mesh.num_faces();

    let brush = CarveBrush::new(
        Point3::new(0.0, 0.0, 1.0),
        BrushParams::reducing(1.0).with_radius(0.5),
    )
    .unwrap();

    let stats = sculpt(&mut mesh, &brush).unwrap();

    assert!(stats.collapses > 0);
    assert!(mesh.num_faces() < faces_before);
    // Manifoldness and the valence-3 lower bound.
    assert!(mesh.check_consistency());
}

// Property: refine followed by reduce shrinks the face count again.
#[test]
fn refine_then_reduce_is_monotone() {
    let mut mesh = icosphere(1.0, 2);
    let center = Point3::new(0.0, 0.0, 1.0);

    let refine = CarveBrush::new(
        center,
        BrushParams::refining(0.06).with_radius(0.3).with_intensity(0.1),
    )
    .unwrap();
    sculpt(&mut mesh, &refine).unwrap();
    let after_refine = mesh.num_faces();

    let reduce = CarveBrush::new(center, BrushParams::reducing(1.0).with_radius(0.3)).unwrap();
    sculpt(&mut mesh, &reduce).unwrap();

    assert!(mesh.num_faces() < after_refine);
    assert!(mesh.check_consistency());
}

// S3: flat grid, brush in the center; the sheet stays flat and the outer
// region untouched. The grid is sized so the touched region plus its
// expansion rings stays interior.
#[test]
fn grid_refine_preserves_flatness_and_outer_region() {
    // 20×20 quads, span 4.0: the brush region plus its expansion rings
    // (radius 0.4, two to three rings of 0.2-wide faces per pass) stays
    // well inside the open boundary and inside the 1.5 stability radius.
    let mut mesh = triangulated_grid(20, 20, 0.2);
    let center = Point3::new(2.0, 2.0, 0.0);
    let vertex_count = mesh.num_vertices() as u32;
    let outer_before: Vec<(u32, Point3<f64>)> = (0..vertex_count)
        .filter(|&v| (mesh.position(v) - center).norm() > 1.5)
        .map(|v| (v, mesh.position(v)))
        .collect();
    assert!(!outer_before.is_empty());

    let brush = NullBrush {
        center,
        params: BrushParams::refining(0.1).with_radius(0.4),
    };
    let stats = sculpt(&mut mesh, &brush).unwrap();

    assert!(stats.splits > 0, "0.2-long edges must split at threshold 0.1");

    // Flatness within tolerance everywhere the mesh was touched.
    for f in mesh.face_indices() {
        let tri = mesh.triangle(f);
        for p in [tri.v0, tri.v1, tri.v2] {
            assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-4);
        }
    }

    // Far-away vertices did not move at all.
    for (v, p) in outer_before {
        assert_eq!(mesh.position(v), p);
    }
}

// S4: relaxation performs zero flips on an all-valence-6 patch.
#[test]
fn relax_is_identity_on_regular_patch() {
    let mut mesh = triangulated_grid(8, 8, 0.5);
    let mut faces = FaceSet::new();
    faces.extend(mesh.face_indices());
    faces.commit();

    assert_eq!(relax_edges(&mut mesh, &faces), 0);
}

// S5: a zero-length edge is collapsed away by the global cleanup.
#[test]
fn coincident_vertices_are_merged() {
    let mut mesh = icosphere(1.0, 1);
    let [a, b, _] = mesh.vertex_indices(0);
    mesh.set_position(b, mesh.position(a));

    assert!(collapse_degenerated_edges(&mut mesh));
    assert!(mesh.check_consistency());
    assert!(shortest_edge(&mesh) >= MIN_EDGE_LENGTH);

    // Idempotence: nothing left to collapse.
    assert!(!collapse_degenerated_edges(&mut mesh));
}

// S6: a maximal reduce stroke must never crash or corrupt the mesh; it
// either empties the mesh (which resets it) or bottoms out at a small
// stable triangulation that the collapse guards refuse to degrade.
#[test]
fn maximal_reduce_bottoms_out_safely() {
    let mut mesh = icosphere(1.0, 1);
    let brush = CarveBrush::new(
        Point3::origin(),
        BrushParams::reducing(1.0).with_radius(10.0),
    )
    .unwrap();

    for _ in 0..20 {
        sculpt(&mut mesh, &brush).unwrap();
        if mesh.is_empty() {
            break;
        }
    }

    if mesh.is_empty() {
        assert_eq!(mesh.num_vertices(), 0, "reset clears the store");
    } else {
        assert!(mesh.num_faces() < 80);
        assert!(mesh.check_consistency());
    }
}

// A stroke on an empty mesh is a no-op.
#[test]
fn stroke_on_empty_mesh_is_noop() {
    let mut mesh = DynamicMesh::new();
    let brush =
        CarveBrush::new(Point3::origin(), BrushParams::refining(0.1).with_radius(1.0)).unwrap();

    let stats = sculpt(&mut mesh, &brush).unwrap();
    assert_eq!(stats, Default::default());
    assert!(mesh.is_empty());
}

// A brush that misses the mesh entirely changes nothing.
#[test]
fn stroke_outside_the_mesh_is_noop() {
    let mut mesh = icosphere(1.0, 1);
    let brush = CarveBrush::new(
        Point3::new(50.0, 0.0, 0.0),
        BrushParams::refining(0.05).with_radius(0.5),
    )
    .unwrap();

    let stats = sculpt(&mut mesh, &brush).unwrap();
    assert!(!stats.changed_topology());
    assert_eq!(mesh.num_faces(), 80);
}

// Repeated refine strokes converge: once the region has settled below the
// threshold, a stroke inserts nothing. Smoothing may nudge an edge back
// over the threshold once or twice, so convergence is given a few strokes.
#[test]
fn refine_converges_to_threshold() {
    let mut mesh = icosphere(1.0, 2);
    let brush = NullBrush {
        center: Point3::new(0.0, 0.0, 1.0),
        params: BrushParams::refining(0.08).with_radius(0.3),
    };

    let mut converged = false;
    for _ in 0..5 {
        let stats = sculpt(&mut mesh, &brush).unwrap();
        if stats.splits == 0 {
            converged = true;
            break;
        }
    }
    assert!(converged, "strokes kept splitting");
    assert!(mesh.check_consistency());
}
