//! Largest-remainder correction step.
//!
//! After every entry has been truncated to whole minor units, a small number
//! of single-unit corrections remain. They go to the entries whose truncation
//! discarded the most, highest remainder first, lowest index on ties.

use tracing::error;

use crate::error::SplitError;

/// Entry indices ranked by descending remainder, ties by ascending index.
pub fn rank_by_remainder(remainders: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..remainders.len()).collect();
    // sort_by is stable, so equal remainders keep index order
    order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]));
    order
}

/// Indices to receive one correction unit each, in bump order.
///
/// Returns exactly `units` indices. When `units` exceeds the entry count the
/// ranking wraps; more than `n` full passes is reported as
/// [`SplitError::AllocationUnstable`].
pub fn remainder_bumps(remainders: &[f64], units: u64) -> Result<Vec<usize>, SplitError> {
    if units == 0 {
        return Ok(Vec::new());
    }

    let n = remainders.len();
    let max_units = (n as u64).saturating_mul(n as u64);
    if n == 0 || units > max_units {
        error!(
            units,
            entries = n,
            "remainder correction exceeds pass limit"
        );
        return Err(SplitError::AllocationUnstable {
            units: i64::try_from(units).unwrap_or(i64::MAX),
            entries: n,
        });
    }

    let ranked = rank_by_remainder(remainders);
    Ok(ranked.iter().copied().cycle().take(units as usize).collect())
}
