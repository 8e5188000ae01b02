//! Sphere primitive and sphere/triangle queries.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::triangle::Triangle;

/// A sphere given by center and radius.
///
/// Used as the brush's region of influence; both queries treat the sphere
/// as a closed ball.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sphere {
    /// Center in world space.
    pub center: Point3<f64>,
    /// Radius, strictly positive for a meaningful region.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere from center and radius.
    #[inline]
    #[must_use]
    pub const fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Whether `p` lies inside the closed ball.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Whether the triangle touches the ball.
    ///
    /// True iff the closest point of the triangle to the center is within
    /// the radius.
    #[must_use]
    pub fn intersects_triangle(&self, tri: &Triangle) -> bool {
        let closest = tri.closest_point(&self.center);
        (closest - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Whether the triangle lies entirely inside the closed ball.
    #[inline]
    #[must_use]
    pub fn contains_triangle(&self, tri: &Triangle) -> bool {
        self.contains_point(&tri.v0) && self.contains_point(&tri.v1) && self.contains_point(&tri.v2)
    }
}
