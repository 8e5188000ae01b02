//! Stroke statistics.

/// Counters accumulated over one stroke (or one global pass).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SculptStats {
    /// Refine-loop iterations executed.
    pub passes: usize,
    /// Midpoint vertices inserted by edge splits.
    pub splits: usize,
    /// Edge flips performed by relaxation.
    pub flips: usize,
    /// Edge collapses performed.
    pub collapses: usize,
}

impl SculptStats {
    /// Whether the stroke changed mesh topology.
    #[must_use]
    pub const fn changed_topology(&self) -> bool {
        self.splits > 0 || self.flips > 0 || self.collapses > 0
    }
}

impl std::fmt::Display for SculptStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passes: {} splits, {} flips, {} collapses",
            self.passes, self.splits, self.flips, self.collapses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_change_detection() {
        let stats = SculptStats {
            passes: 2,
            splits: 10,
            flips: 3,
            collapses: 0,
        };
        assert!(stats.changed_topology());
        assert_eq!(format!("{stats}"), "2 passes: 10 splits, 3 flips, 0 collapses");
        assert!(!SculptStats::default().changed_topology());
    }
}
