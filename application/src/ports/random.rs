//! Random source port
//!
//! The turn-count policy and persona selection draw from this port so the
//! orchestrator stays deterministic under test.

/// Uniform randomness for turn planning
pub trait RandomSource: Send + Sync {
    /// One uniform draw in [0, 1)
    fn roll(&self) -> f64;

    /// Uniform index in 0..len. `len` must be non-zero.
    fn pick(&self, len: usize) -> usize;
}
