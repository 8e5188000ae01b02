//! Deferred topology edits, applied to the mesh atomically.

use hashbrown::{HashMap, HashSet};
use mesh_dynamic::{DynamicMesh, FaceSet};

/// Canonical unordered edge key.
#[inline]
pub(crate) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    debug_assert_ne!(a, b);
    (a.min(b), a.max(b))
}

/// Midpoint vertices inserted by a split pass, keyed by the edge they were
/// inserted into. Lives for one driver iteration.
#[derive(Debug, Default)]
pub struct NewVertices {
    map: HashMap<(u32, u32), u32>,
}

impl NewVertices {
    /// The midpoint vertex registered for edge `(a, b)`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, a: u32, b: u32) -> Option<u32> {
        self.map.get(&edge_key(a, b)).copied()
    }

    /// Whether edge `(a, b)` already has a midpoint.
    #[inline]
    #[must_use]
    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.map.contains_key(&edge_key(a, b))
    }

    /// Register the midpoint vertex `v` for edge `(a, b)`.
    pub fn insert(&mut self, a: u32, b: u32, v: u32) {
        let previous = self.map.insert(edge_key(a, b), v);
        debug_assert!(previous.is_none(), "edge split twice in one pass");
    }

    /// Number of registered midpoints.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no midpoints are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop all registered midpoints.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// A batch of face deletions and additions belonging to one topological
/// rewrite.
///
/// Deletions are applied first so that additions recycle the freed slots
/// (most recently freed first). Additions beyond the deleted count are new
/// region members and are placed in the face-set's staging buffer; the
/// earlier additions land on recycled indices the set already tracks.
#[derive(Debug, Default)]
pub(crate) struct NewFaces {
    triples: Vec<[u32; 3]>,
    delete_order: Vec<u32>,
    delete_set: HashSet<u32>,
}

impl NewFaces {
    pub(crate) fn add_face(&mut self, i1: u32, i2: u32, i3: u32) {
        self.triples.push([i1, i2, i3]);
    }

    pub(crate) fn delete_face(&mut self, f: u32) {
        if self.delete_set.insert(f) {
            self.delete_order.push(f);
        }
    }

    /// Apply deletions, then additions. Returns whether the batch did not
    /// shrink the mesh (deletions ≤ additions); additions are skipped when
    /// the deletions emptied the mesh.
    pub(crate) fn apply_to_mesh(&self, mesh: &mut DynamicMesh, faces: &mut FaceSet) -> bool {
        for &f in &self.delete_order {
            mesh.delete_face(f);
        }

        if mesh.is_empty() {
            return false;
        }

        for (k, &[i1, i2, i3]) in self.triples.iter().enumerate() {
            let f = mesh.add_face(i1, i2, i3);
            if k >= self.delete_order.len() {
                faces.insert(f);
            }
        }
        self.delete_order.len() <= self.triples.len()
    }
}
