//! Mutable indexed triangle mesh with free-lists and adjacency.

// Mesh indices fit in u32 and counts fit in f64 mantissas
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::faces::FaceSet;
use crate::triangle::Triangle;
use crate::vertex::Vertex;

/// A mutable two-manifold triangle mesh indexed by stable handles.
///
/// Vertices and faces live in slotted arrays; deleting an entity pushes its
/// index onto a LIFO free-list and adding pops the most recently freed slot
/// before growing the arrays. Indices therefore stay valid across deletions
/// of *other* entities, which is what lets topological edits hold plain
/// `u32` handles while the mesh is rewritten around them.
///
/// Per-vertex adjacency (the list of incident face indices) is maintained
/// eagerly by `add_face`/`delete_face`; valence, one-ring neighborhoods,
/// and average positions are derived from it.
///
/// # Example
///
/// ```
/// use mesh_dynamic::{DynamicMesh, Point3, Vector3};
///
/// let mut mesh = DynamicMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::z());
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0), Vector3::z());
/// let f = mesh.add_face(a, b, c);
///
/// assert_eq!(mesh.valence(a), 1);
/// assert_eq!(mesh.vertex_indices(f), [a, b, c]);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DynamicMesh {
    vertices: Vec<Vertex>,
    vertex_free: Vec<bool>,
    free_vertices: Vec<u32>,
    adjacency: Vec<Vec<u32>>,

    faces: Vec<[u32; 3]>,
    face_normals: Vec<Vector3<f64>>,
    face_free: Vec<bool>,
    free_faces: Vec<u32>,

    num_live_vertices: usize,
    num_live_faces: usize,
}

impl DynamicMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all vertices, faces, and free-lists.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of live (non-free) vertices.
    #[inline]
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.num_live_vertices
    }

    /// Number of live (non-free) faces.
    #[inline]
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.num_live_faces
    }

    /// Whether the mesh has no live faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_live_faces == 0
    }

    /// Whether the vertex slot is free.
    #[inline]
    #[must_use]
    pub fn is_free_vertex(&self, v: u32) -> bool {
        self.vertex_free[v as usize]
    }

    /// Whether the face slot is free.
    #[inline]
    #[must_use]
    pub fn is_free_face(&self, f: u32) -> bool {
        self.face_free[f as usize]
    }

    /// Add a vertex, recycling the most recently freed slot if any.
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        self.num_live_vertices += 1;
        if let Some(i) = self.free_vertices.pop() {
            let slot = i as usize;
            debug_assert!(self.vertex_free[slot]);
            debug_assert!(self.adjacency[slot].is_empty());
            self.vertices[slot] = Vertex::new(position, normal);
            self.vertex_free[slot] = false;
            i
        } else {
            self.vertices.push(Vertex::new(position, normal));
            self.vertex_free.push(false);
            self.adjacency.push(Vec::new());
            (self.vertices.len() - 1) as u32
        }
    }

    /// Free a vertex. The vertex must not be referenced by any face.
    pub fn delete_vertex(&mut self, v: u32) {
        let slot = v as usize;
        assert!(!self.vertex_free[slot]);
        assert!(
            self.adjacency[slot].is_empty(),
            "deleting vertex {v} that still has incident faces"
        );
        self.vertex_free[slot] = true;
        self.free_vertices.push(v);
        self.num_live_vertices -= 1;
    }

    /// Add a face, recycling the most recently freed slot if any.
    ///
    /// Updates the adjacency of all three vertices and caches the face
    /// normal. Vertex positions are not touched.
    pub fn add_face(&mut self, i1: u32, i2: u32, i3: u32) -> u32 {
        assert!(i1 != i2 && i1 != i3 && i2 != i3, "degenerate face ({i1}, {i2}, {i3})");
        assert!(!self.is_free_vertex(i1) && !self.is_free_vertex(i2) && !self.is_free_vertex(i3));

        let normal = Triangle::new(
            self.vertices[i1 as usize].position,
            self.vertices[i2 as usize].position,
            self.vertices[i3 as usize].position,
        )
        .normal()
        .unwrap_or_else(Vector3::zeros);

        self.num_live_faces += 1;
        let f = if let Some(i) = self.free_faces.pop() {
            let slot = i as usize;
            debug_assert!(self.face_free[slot]);
            self.faces[slot] = [i1, i2, i3];
            self.face_normals[slot] = normal;
            self.face_free[slot] = false;
            i
        } else {
            self.faces.push([i1, i2, i3]);
            self.face_normals.push(normal);
            self.face_free.push(false);
            (self.faces.len() - 1) as u32
        };

        self.adjacency[i1 as usize].push(f);
        self.adjacency[i2 as usize].push(f);
        self.adjacency[i3 as usize].push(f);
        f
    }

    /// Free a face and remove it from the adjacency of its three vertices.
    pub fn delete_face(&mut self, f: u32) {
        let slot = f as usize;
        assert!(!self.face_free[slot]);

        let [i1, i2, i3] = self.faces[slot];
        for v in [i1, i2, i3] {
            self.adjacency[v as usize].retain(|&a| a != f);
        }
        self.face_free[slot] = true;
        self.free_faces.push(f);
        self.num_live_faces -= 1;
    }

    /// Position of a vertex.
    #[inline]
    #[must_use]
    pub fn position(&self, v: u32) -> Point3<f64> {
        debug_assert!(!self.is_free_vertex(v));
        self.vertices[v as usize].position
    }

    /// Move a vertex. Topology and cached face normals are unaffected
    /// until [`Self::realign_face`] is called.
    #[inline]
    pub fn set_position(&mut self, v: u32, position: Point3<f64>) {
        debug_assert!(!self.is_free_vertex(v));
        self.vertices[v as usize].position = position;
    }

    /// Stored normal of a vertex.
    #[inline]
    #[must_use]
    pub fn vertex_normal(&self, v: u32) -> Vector3<f64> {
        debug_assert!(!self.is_free_vertex(v));
        self.vertices[v as usize].normal
    }

    /// Overwrite the stored normal of a vertex.
    #[inline]
    pub fn set_vertex_normal(&mut self, v: u32, normal: Vector3<f64>) {
        debug_assert!(!self.is_free_vertex(v));
        self.vertices[v as usize].normal = normal;
    }

    /// The vertex index triple of a face.
    #[inline]
    #[must_use]
    pub fn vertex_indices(&self, f: u32) -> [u32; 3] {
        debug_assert!(!self.is_free_face(f));
        self.faces[f as usize]
    }

    /// The face as a concrete triangle.
    #[inline]
    #[must_use]
    pub fn triangle(&self, f: u32) -> Triangle {
        let [i1, i2, i3] = self.vertex_indices(f);
        Triangle::new(
            self.vertices[i1 as usize].position,
            self.vertices[i2 as usize].position,
            self.vertices[i3 as usize].position,
        )
    }

    /// The cached face normal, refreshed by [`Self::realign_face`].
    #[inline]
    #[must_use]
    pub fn face_normal(&self, f: u32) -> Vector3<f64> {
        debug_assert!(!self.is_free_face(f));
        self.face_normals[f as usize]
    }

    /// The faces incident to a vertex.
    #[inline]
    #[must_use]
    pub fn adjacent_faces(&self, v: u32) -> &[u32] {
        debug_assert!(!self.is_free_vertex(v));
        &self.adjacency[v as usize]
    }

    /// Number of faces incident to a vertex.
    #[inline]
    #[must_use]
    pub fn valence(&self, v: u32) -> usize {
        self.adjacent_faces(v).len()
    }

    /// Iterate over the indices of all live faces.
    pub fn face_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.face_free
            .iter()
            .enumerate()
            .filter(|(_, &free)| !free)
            .map(|(i, _)| i as u32)
    }

    /// Unique vertices incident to the committed members of `faces`, in
    /// first-seen order.
    #[must_use]
    pub fn vertices_of(&self, faces: &FaceSet) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for f in faces.iter() {
            if self.is_free_face(f) {
                continue;
            }
            for v in self.vertex_indices(f) {
                if seen.insert(v) {
                    result.push(v);
                }
            }
        }
        result
    }

    /// Visit every live face incident to a vertex of the committed set
    /// (the one-ring closure of the set), each exactly once.
    ///
    /// The face list is snapshotted before the first call, so the visit
    /// order is unaffected by mutations performed in `f`. Faces freed by an
    /// earlier call are skipped.
    pub fn for_each_face_ext<F: FnMut(&mut Self, u32)>(&mut self, faces: &FaceSet, mut f: F) {
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for v in self.vertices_of(faces) {
            for &a in self.adjacent_faces(v) {
                if seen.insert(a) {
                    pending.push(a);
                }
            }
        }
        for a in pending {
            if !self.is_free_face(a) {
                f(self, a);
            }
        }
    }

    /// Centroid of the unique one-ring neighbor vertices of `v`.
    #[must_use]
    pub fn average_position(&self, v: u32) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0.0;
        let mut seen = HashSet::new();
        for &f in self.adjacent_faces(v) {
            for n in self.vertex_indices(f) {
                if n != v && seen.insert(n) {
                    sum += self.vertices[n as usize].position.coords;
                    count += 1.0;
                }
            }
        }
        debug_assert!(count > 0.0);
        Point3::from(sum / count)
    }

    /// Mean squared edge length over the distinct edges of the committed
    /// face set. Zero for an empty set.
    #[must_use]
    pub fn average_edge_length_sqr(&self, faces: &FaceSet) -> f64 {
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut sum = 0.0;
        for f in faces.iter() {
            if self.is_free_face(f) {
                continue;
            }
            let [i1, i2, i3] = self.vertex_indices(f);
            for (a, b) in [(i1, i2), (i2, i3), (i3, i1)] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    sum += (self.position(a) - self.position(b)).norm_squared();
                }
            }
        }
        if seen.is_empty() {
            0.0
        } else {
            sum / seen.len() as f64
        }
    }

    /// Recompute the vertex normal as the area-weighted sum of incident
    /// face normals. Keeps the previously stored normal when the weighted
    /// sum vanishes.
    pub fn update_vertex_normal(&mut self, v: u32) {
        let mut sum = Vector3::zeros();
        for &f in self.adjacency[v as usize].iter() {
            // Unnormalized cross product: magnitude is twice the face area,
            // which is exactly the area weighting.
            sum += self.triangle(f).normal_unnormalized();
        }
        let len_sq = sum.norm_squared();
        if len_sq > f64::EPSILON {
            self.vertices[v as usize].normal = sum / len_sq.sqrt();
        }
    }

    /// Refresh the cached face normal from current vertex positions.
    pub fn realign_face(&mut self, f: u32) {
        debug_assert!(!self.is_free_face(f));
        if let Some(n) = self.triangle(f).normal() {
            self.face_normals[f as usize] = n;
        }
    }

    /// Validate the mesh invariants. Returns `false` and logs a warning
    /// for every violated class. Intended for tests and debug assertions.
    #[must_use]
    pub fn check_consistency(&self) -> bool {
        let mut ok = true;

        // Faces: distinct live vertices, adjacency agreement.
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for f in self.face_indices() {
            let [i1, i2, i3] = self.faces[f as usize];
            if i1 == i2 || i1 == i3 || i2 == i3 {
                warn!(face = f, "degenerate face");
                ok = false;
            }
            for v in [i1, i2, i3] {
                if self.vertex_free.get(v as usize).copied().unwrap_or(true) {
                    warn!(face = f, vertex = v, "face references free vertex");
                    ok = false;
                } else if !self.adjacency[v as usize].contains(&f) {
                    warn!(face = f, vertex = v, "face missing from vertex adjacency");
                    ok = false;
                }
            }
            for (a, b) in [(i1, i2), (i2, i3), (i3, i1)] {
                *directed.entry((a, b)).or_insert(0) += 1;
            }
        }

        // Manifold with opposite orientation: every directed edge occurs
        // once and so does its reverse.
        for (&(a, b), &count) in &directed {
            if count > 1 {
                warn!(edge = ?(a, b), count, "edge traversed twice in the same direction");
                ok = false;
            }
            if !directed.contains_key(&(b, a)) {
                warn!(edge = ?(a, b), "boundary or mis-oriented edge");
                ok = false;
            }
        }

        // Vertices: valence and adjacency hygiene.
        for (i, free) in self.vertex_free.iter().enumerate() {
            let v = i as u32;
            if *free {
                if !self.adjacency[i].is_empty() {
                    warn!(vertex = v, "free vertex with incident faces");
                    ok = false;
                }
                continue;
            }
            if self.adjacency[i].len() < 3 {
                warn!(vertex = v, valence = self.adjacency[i].len(), "valence below 3");
                ok = false;
            }
            let mut seen = HashSet::new();
            for &f in &self.adjacency[i] {
                if !seen.insert(f) {
                    warn!(vertex = v, face = f, "duplicate adjacency entry");
                    ok = false;
                }
                if self.face_free.get(f as usize).copied().unwrap_or(true) {
                    warn!(vertex = v, face = f, "adjacency references free face");
                    ok = false;
                } else if !self.faces[f as usize].contains(&v) {
                    warn!(vertex = v, face = f, "adjacency entry does not reference vertex");
                    ok = false;
                }
            }
        }

        ok && self.check_free_lists()
    }

    fn check_free_lists(&self) -> bool {
        let mut ok = true;

        let mut seen = HashSet::new();
        for &v in &self.free_vertices {
            if !seen.insert(v) {
                warn!(vertex = v, "duplicate vertex free-list entry");
                ok = false;
            }
            if !self.vertex_free.get(v as usize).copied().unwrap_or(false) {
                warn!(vertex = v, "live vertex on free-list");
                ok = false;
            }
        }
        if seen.len() != self.vertex_free.iter().filter(|&&f| f).count() {
            warn!("vertex free-list out of sync with free flags");
            ok = false;
        }

        let mut seen = HashSet::new();
        for &f in &self.free_faces {
            if !seen.insert(f) {
                warn!(face = f, "duplicate face free-list entry");
                ok = false;
            }
            if !self.face_free.get(f as usize).copied().unwrap_or(false) {
                warn!(face = f, "live face on free-list");
                ok = false;
            }
        }
        if seen.len() != self.face_free.iter().filter(|&&f| f).count() {
            warn!("face free-list out of sync with free flags");
            ok = false;
        }

        ok
    }
}
