//! Brush parameters.

use crate::error::{SculptError, SculptResult};

/// Parameters of a sculpt brush.
///
/// A brush either *refines* (splits edges above `subdiv_threshold`,
/// relaxes, smooths, then applies its displacement) or *reduces*
/// (collapses edges below a fraction of the regional average length given
/// by `intensity`).
#[derive(Debug, Clone)]
pub struct BrushParams {
    /// Radius of the spherical region of influence, in world units.
    pub radius: f64,

    /// Collapse scaling for reduce mode, in (0, 1]. The collapse threshold
    /// is `average_edge_length_sqr · intensity`.
    pub intensity: f64,

    /// Target maximum edge length in refine mode.
    pub subdiv_threshold: f64,

    /// Mode flag: coarsen instead of refine.
    pub reduce: bool,
}

impl Default for BrushParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            intensity: 0.5,
            subdiv_threshold: 0.1,
            reduce: false,
        }
    }
}

impl BrushParams {
    /// Create parameters with default values (refine mode).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create refine-mode parameters with a target edge length.
    #[must_use]
    pub fn refining(subdiv_threshold: f64) -> Self {
        Self {
            subdiv_threshold,
            reduce: false,
            ..Self::default()
        }
    }

    /// Create reduce-mode parameters with a collapse intensity.
    #[must_use]
    pub fn reducing(intensity: f64) -> Self {
        Self {
            intensity,
            reduce: true,
            ..Self::default()
        }
    }

    /// Set the brush radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the reduce-mode intensity.
    #[must_use]
    pub const fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the refine-mode subdivision threshold.
    #[must_use]
    pub const fn with_subdiv_threshold(mut self, threshold: f64) -> Self {
        self.subdiv_threshold = threshold;
        self
    }

    /// Set the mode flag.
    #[must_use]
    pub const fn with_reduce(mut self, reduce: bool) -> Self {
        self.reduce = reduce;
        self
    }

    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or subdivision threshold is not
    /// strictly positive, or the intensity lies outside (0, 1].
    pub fn validate(&self) -> SculptResult<()> {
        if self.radius <= 0.0 || self.radius.is_nan() {
            return Err(SculptError::InvalidRadius(self.radius));
        }
        if self.intensity <= 0.0 || self.intensity > 1.0 || self.intensity.is_nan() {
            return Err(SculptError::InvalidIntensity(self.intensity));
        }
        if self.subdiv_threshold <= 0.0 || self.subdiv_threshold.is_nan() {
            return Err(SculptError::InvalidSubdivThreshold(self.subdiv_threshold));
        }
        Ok(())
    }
}
