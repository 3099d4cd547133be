//! Scoring and selection of candidate events.

use std::cmp::Ordering;

use crate::models::ScoredEvent;

/// Weight of each reservation, from any user, on a candidate event
pub const RESERVATION_WEIGHT: f64 = 0.6;
/// Weight of each "loved" favorite on a candidate event
pub const LOVED_WEIGHT: f64 = 0.4;

/// Aggregate score for an event given its reservation and loved counts
pub fn weighted_score(reservation_count: i64, loved_count: i64) -> f64 {
    RESERVATION_WEIGHT * reservation_count as f64 + LOVED_WEIGHT * loved_count as f64
}

/// Score for a candidate, or `None` when the event has no reservations and
/// no favorites at all.
pub fn candidate_score(reservation_count: i64, loved_count: i64, has_activity: bool) -> Option<f64> {
    has_activity.then(|| weighted_score(reservation_count, loved_count))
}

/// Highest score first, undefined scores last.
///
/// Equal scores keep the order they arrived in, which for database results
/// is unspecified.
pub fn rank(candidates: &mut [ScoredEvent]) {
    candidates.sort_by(|a, b| match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Picks the head of a ranked list and its middle element (`len / 2`).
///
/// A single candidate is returned once. Entries without a score are dropped.
pub fn pick_first_and_middle(ranked: Vec<ScoredEvent>) -> Vec<ScoredEvent> {
    let middle = ranked.len() / 2;
    ranked
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| *idx == 0 || *idx == middle)
        .map(|(_, candidate)| candidate)
        .filter(|candidate| candidate.score.is_some())
        .collect()
}
