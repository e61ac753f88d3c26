//! Deterministic top-B selection over scored samples.

use std::cmp::Ordering;

use cal_core::models::{SampleIndex, SelectionBatch};

/// Highest scores first; equal scores by ascending sample index.
///
/// NaN scores rank below every number.
pub fn rank_descending(mut scored: Vec<(SampleIndex, f64)>, take: usize) -> SelectionBatch {
    scored.sort_by(|a, b| descending(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(take);
    scored.into_iter().map(|(index, _)| index).collect::<Vec<_>>().into()
}

/// Lowest scores first; equal scores by ascending sample index.
///
/// NaN scores still rank last.
pub fn rank_ascending(mut scored: Vec<(SampleIndex, f64)>, take: usize) -> SelectionBatch {
    scored.sort_by(|a, b| ascending(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(take);
    scored.into_iter().map(|(index, _)| index).collect::<Vec<_>>().into()
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

fn ascending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}
