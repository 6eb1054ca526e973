//! Permitted value range aggregation
//!
//! Dictionaries often list a single permitted value next to a range that
//! starts or ends at that value, e.g. `(1,1)` and `(1,5)`. Point rows
//! become boundaries: any range edge equal to one of them is snapped to
//! it, and the point rows themselves are not kept as separate ranges.

use crate::cif;
use crate::dictionary::ValueRange;

/// Merge point rows into the ranges they bound
pub fn aggregate_inclusive_ranges(ranges: &[ValueRange]) -> Vec<ValueRange> {
    let boundaries: Vec<&str> = ranges
        .iter()
        .filter(|r| r.is_point())
        .map(|r| r.min.as_str())
        .collect();

    let snap = |edge: &str| -> String {
        boundaries
            .iter()
            .find(|b| cif::is_ci_equal(b, edge))
            .map(|b| b.to_string())
            .unwrap_or_else(|| edge.to_string())
    };

    ranges
        .iter()
        .filter(|r| !r.is_point())
        .map(|r| ValueRange::new(snap(&r.min), snap(&r.max)))
        .collect()
}

/// Check if the aggregated ranges are more than one interval
pub fn has_multiple_sub_ranges(ranges: &[ValueRange]) -> bool {
    aggregate_inclusive_ranges(ranges).len() > 1
}

/// Check if any range row has a bound at all
pub fn has_range_restriction(ranges: &[ValueRange]) -> bool {
    ranges.iter().any(|r| !r.is_unbounded())
}
