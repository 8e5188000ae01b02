//! Vertex type.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex: a position and a unit normal.
///
/// Unlike a static mesh, a sculptable mesh keeps normals up to date
/// continuously, so the normal is a plain field rather than an optional
/// attribute. Operations that create vertices before the surrounding
/// topology exists (edge collapse) write a zero normal; the finalize pass
/// replaces it with the area-weighted average of the incident faces.
///
/// # Example
///
/// ```
/// use mesh_dynamic::{Point3, Vector3, Vertex};
///
/// let v = Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::x());
/// assert_eq!(v.position.x, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Unit normal. Zero only transiently, between a topological edit
    /// that created the vertex and the finalize pass of the same stroke.
    pub normal: Vector3<f64>,
}

impl Vertex {
    /// Create a vertex from a position and a normal.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Create a vertex from raw coordinates with a zero normal.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z), Vector3::zeros())
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_from_coords_has_zero_normal() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0);
        assert!((v.position.y - 2.0).abs() < f64::EPSILON);
        assert_eq!(v.normal, Vector3::zeros());
    }

    #[test]
    fn vertex_from_point() {
        let v: Vertex = Point3::new(0.5, 0.0, 0.0).into();
        assert!((v.position.x - 0.5).abs() < f64::EPSILON);
    }
}
