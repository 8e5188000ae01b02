//! Mutable indexed triangle mesh for interactive editing.
//!
//! This crate provides the data structures that local remeshing operates on:
//!
//! - [`DynamicMesh`] - slotted vertex/face arrays with LIFO free-lists and
//!   per-vertex adjacency, so indices stay stable across unrelated edits
//! - [`FaceSet`] - a face-index set with a committed view and an uncommitted
//!   staging buffer, for algorithms that grow a region while traversing it
//! - [`Vertex`], [`Triangle`], [`Sphere`] - geometric primitives, including
//!   the sphere/triangle queries used to resolve a brush's region of
//!   influence
//! - [`shapes`] - icosphere and grid constructors for tests and demos
//!
//! # Coordinate System
//!
//! Right-handed, `f64` throughout. Face winding is **counter-clockwise when
//! viewed from outside**; normals follow the right-hand rule.
//!
//! # Index Stability
//!
//! Deleting a vertex or face frees its slot without moving other entities.
//! Freed slots are recycled most-recently-freed first. Consumers holding
//! indices across a mutation must re-check freeness with
//! [`DynamicMesh::is_free_vertex`] / [`DynamicMesh::is_free_face`].
//!
//! # Example
//!
//! ```
//! use mesh_dynamic::{shapes, FaceSet};
//!
//! let mesh = shapes::icosphere(1.0, 1);
//! let mut faces = FaceSet::new();
//! faces.extend(mesh.face_indices());
//! faces.commit();
//!
//! assert_eq!(faces.len(), mesh.num_faces());
//! assert!(mesh.check_consistency());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod faces;
mod mesh;
pub mod shapes;
mod sphere;
mod triangle;
mod vertex;

pub use faces::FaceSet;
pub use mesh::DynamicMesh;
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
