//! Error types for sculpt strokes.

use thiserror::Error;

/// Errors produced by brush parameter validation.
///
/// The kernel itself is total: once a stroke starts mutating the mesh no
/// error is produced: rejected edits return `false` and precondition
/// violations are assertions.
#[derive(Debug, Error)]
pub enum SculptError {
    /// Brush radius must be strictly positive.
    #[error("Invalid brush radius: {0} (must be > 0)")]
    InvalidRadius(f64),

    /// Reduce-mode intensity must lie in (0, 1].
    #[error("Invalid brush intensity: {0} (must be in (0, 1])")]
    InvalidIntensity(f64),

    /// Refine-mode subdivision threshold must be strictly positive.
    #[error("Invalid subdivision threshold: {0} (must be > 0)")]
    InvalidSubdivThreshold(f64),
}

/// Result type for sculpt operations.
pub type SculptResult<T> = std::result::Result<T, SculptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SculptError::InvalidRadius(0.0);
        assert!(format!("{err}").contains("radius"));

        let err = SculptError::InvalidIntensity(1.5);
        assert!(format!("{err}").contains("1.5"));
    }
}
