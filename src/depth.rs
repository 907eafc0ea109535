//! Coverage depth estimation.

/// Depth of coverage derived from the translated read set and the genome
/// size estimate.
///
/// The integer depths parameterize the external tools: `repeat_threshold`
/// feeds `REPmask -c` and `base_depth` feeds `DASqv -c`, unless the user
/// supplied their own `-c` for that tool. They only tune how aggressively
/// repeats are masked; the pipeline mechanics do not depend on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageDepth {
    /// Unrounded total-bases / genome-size ratio, for reporting.
    pub raw: f64,
    /// Average depth of coverage, rounded, at least 1.
    pub base_depth: u64,
    /// Depth at which a region counts as repeat, rounded, at least 1.
    pub repeat_threshold: u64,
}

impl CoverageDepth {
    #[must_use]
    pub fn estimate(total_bases: u64, genome_size: u64, repeat_depth: f64) -> Self {
        let raw = total_bases as f64 / genome_size as f64;
        let base_depth = (raw.round() as i64).max(1) as u64;
        let repeat_threshold = ((base_depth as f64 * repeat_depth).round() as i64).max(1) as u64;
        Self {
            raw,
            base_depth,
            repeat_threshold,
        }
    }
}
