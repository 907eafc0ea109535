//! Parsing of the synthetic headers on extracted scrubbed reads.
//!
//! The translator names reads `reads/<n>/0_<len>` and the database extractor
//! preserves that shape, with the range replaced by the surviving
//! `<start>_<end>` window of each segment.

use std::fmt;

/// Half-open range of a scrubbed segment within its source read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub start: u64,
    pub end: u64,
}

impl fmt::Display for SegmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.start, self.end)
    }
}

/// A parsed synthetic read name of the form `reads/<n>/<start>_<end>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticName {
    /// Read number assigned during translation.
    pub read_num: u64,
    pub range: SegmentRange,
}

/// Parse a synthetic read name. Returns `None` if the name does not have
/// the `well/<n>/<start>_<end>` shape.
#[must_use]
pub fn parse_synthetic_name(name: &str) -> Option<SyntheticName> {
    let mut parts = name.split('/');
    let _well = parts.next()?;
    let read_num: u64 = parts.next()?.parse().ok()?;
    let range = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let (start, end) = range.split_once('_')?;
    Some(SyntheticName {
        read_num,
        range: SegmentRange {
            start: start.parse().ok()?,
            end: end.parse().ok()?,
        },
    })
}
