//! Brush-driven adaptive remeshing.
//!
//! Given a spherical brush region on a [`DynamicMesh`](mesh_dynamic::DynamicMesh),
//! this crate locally refines, coarsens, relaxes, and smooths the
//! triangulation so triangles stay well-shaped across arbitrary strokes,
//! while preserving a valid two-manifold mesh with target edge-length and
//! valence properties.
//!
//! The building blocks (edge [`split_edges`] / [`triangulate`],
//! [`collapse_edge`], [`relax_edges`], region expansion, [`smooth`]) are
//! exposed individually and sequenced by the [`sculpt`] driver:
//!
//! - **Refine**: grow the region from the brush sphere, split edges above
//!   the subdivision threshold, re-triangulate, flip edges around poles,
//!   smooth tangentially; repeat until no edge in the region is too long.
//!   Then apply the brush displacement and collapse degenerate edges.
//! - **Reduce**: collapse edges shorter than the regional average scaled by
//!   the brush intensity, then smooth the surroundings.
//!
//! # Examples
//!
//! ```
//! use mesh_dynamic::{shapes, Point3};
//! use mesh_sculpt::{sculpt, BrushParams, CarveBrush};
//!
//! let mut mesh = shapes::icosphere(1.0, 2);
//! let before = mesh.num_faces();
//!
//! // Refine and raise a bump around the north pole.
//! let params = BrushParams::refining(0.08).with_radius(0.3).with_intensity(0.2);
//! let brush = CarveBrush::new(Point3::new(0.0, 0.0, 1.0), params)?;
//! let stats = sculpt(&mut mesh, &brush)?;
//!
//! assert!(stats.splits > 0);
//! assert!(mesh.num_faces() > before);
//! assert!(mesh.check_consistency());
//! # Ok::<(), mesh_sculpt::SculptError>(())
//! ```
//!
//! Coarsening the same region:
//!
//! ```
//! use mesh_dynamic::{shapes, Point3};
//! use mesh_sculpt::{sculpt, BrushParams, CarveBrush};
//!
//! let mut mesh = shapes::icosphere(1.0, 2);
//! let before = mesh.num_faces();
//!
//! // Intensity 1.0 collapses every edge below the regional mean.
//! let brush = CarveBrush::new(
//!     Point3::new(0.0, 0.0, 1.0),
//!     BrushParams::reducing(1.0).with_radius(0.4),
//! )?;
//! sculpt(&mut mesh, &brush)?;
//!
//! assert!(mesh.num_faces() < before);
//! # Ok::<(), mesh_sculpt::SculptError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod action;
mod batch;
mod brush;
mod collapse;
mod domain;
mod error;
mod params;
mod relax;
mod result;
mod smooth;
mod split;

pub use action::{collapse_degenerated_edges, delete_faces, finalize, sculpt, smooth_mesh};
pub use batch::NewVertices;
pub use brush::{affected_faces, Brush, CarveBrush};
pub use collapse::{
    collapse_all_edges, collapse_edge, collapse_edges, collapse_edges_by_length,
    delete_valence3_vertex,
};
pub use domain::{extend_and_filter_domain, extend_domain, extend_domain_by_poles};
pub use error::{SculptError, SculptResult};
pub use params::BrushParams;
pub use relax::relax_edges;
pub use result::SculptStats;
pub use smooth::smooth;
pub use split::{split_edges, split_position, triangulate};

/// Edges shorter than this never survive a stroke; splits are clamped so
/// they cannot produce one.
pub const MIN_EDGE_LENGTH: f64 = 0.001;

/// Two unit normals with `1 − |n1·n2|` below this are treated as colinear
/// by [`split_position`]. The loose bound keeps the tangent-plane
/// intersection away from near-singular denominators.
pub const COLINEAR_EPSILON: f64 = 1e-4;

/// Tolerance for barycentric containment during smoothing reprojection.
pub const BARYCENTRIC_EPSILON: f64 = 1e-9;
