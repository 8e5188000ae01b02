//! Shape constructors for tests, benchmarks, and demos.

// Vertex counts stay far below u32::MAX
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::mesh::DynamicMesh;

/// Build an icosphere: an icosahedron refined by `subdivisions` rounds of
/// midpoint subdivision, with every vertex projected onto the sphere of the
/// given radius. Normals are radial.
///
/// Face count is `20 · 4^subdivisions`.
///
/// # Example
///
/// ```
/// use mesh_dynamic::shapes::icosphere;
///
/// let mesh = icosphere(1.0, 2);
/// assert_eq!(mesh.num_faces(), 320);
/// assert!(mesh.check_consistency());
/// ```
#[must_use]
pub fn icosphere(radius: f64, subdivisions: u32) -> DynamicMesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut positions: Vec<Vector3<f64>> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Vector3::new(x, y, z).normalize() * radius)
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vector3<f64>>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (positions[a as usize] + positions[b as usize]) / 2.0;
                positions.push(mid.normalize() * radius);
                (positions.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut positions);
            let bc = midpoint(b, c, &mut positions);
            let ca = midpoint(c, a, &mut positions);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let mut mesh = DynamicMesh::new();
    for p in &positions {
        mesh.add_vertex(Point3::from(*p), p.normalize());
    }
    for &[a, b, c] in &faces {
        mesh.add_face(a, b, c);
    }
    mesh
}

/// Build a flat triangulated grid of `nx × ny` quads with the given spacing,
/// lying in the z = 0 plane with +Z normals.
///
/// The boundary is open: boundary edges have a single incident face, so the
/// full-mesh consistency check does not apply. Intended for tests whose
/// touched region stays in the interior.
#[must_use]
pub fn triangulated_grid(nx: u32, ny: u32, spacing: f64) -> DynamicMesh {
    let mut mesh = DynamicMesh::new();

    for j in 0..=ny {
        for i in 0..=nx {
            mesh.add_vertex(
                Point3::new(f64::from(i) * spacing, f64::from(j) * spacing, 0.0),
                Vector3::z(),
            );
        }
    }

    let stride = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let v00 = j * stride + i;
            let v10 = v00 + 1;
            let v01 = v00 + stride;
            let v11 = v01 + 1;
            mesh.add_face(v00, v10, v11);
            mesh.add_face(v00, v11, v01);
        }
    }
    mesh
}
