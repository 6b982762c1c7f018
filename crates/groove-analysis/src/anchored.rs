//! Anchored matching: align a known move to the history beat by beat.

use std::sync::Arc;

use groove_core::{Sample, Timestamp};
use groove_moves::Move;
use serde::Serialize;

use crate::detection::DetectedPosition;
use crate::fit::{best_fit, best_fit_beat};

/// Outcome of [`match_to_recording`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Time from the start of the history to the first matched beat (ms)
    pub offset_ms: i64,
    pub start: Timestamp,
    pub num_moves: usize,
    pub average_error: f64,
    /// History index of every matched beat
    pub frames: Vec<usize>,
    pub errors: Vec<f64>,
    /// Time between consecutive matches, one shorter than `frames`
    pub deltas: Vec<i64>,
    /// Expected position of every beat, bound to the observed facing direction
    pub positions: Vec<DetectedPosition>,
}

/// Find the move's positions in the recorded history.
///
/// The first beat may sit anywhere within the first cycle, so it is searched
/// from the very first sample with a window that grows by 20% until it spans
/// the whole history. Every following beat is searched in
/// `[min_dt, max_dt]` after the previous match.
///
/// # Panics
///
/// If `min_dt > max_dt`.
pub fn match_to_recording(
    history: &[Sample],
    mv: &Move,
    min_dt: i64,
    max_dt: i64,
) -> Option<MatchResult> {
    assert!(min_dt <= max_dt, "{min_dt} <= {max_dt}");
    let (Some(first_sample), Some(last_sample)) = (history.first(), history.last()) else {
        tracing::warn!("no positions to match to move {}", mv.name());
        return None;
    };
    if mv.is_empty() {
        tracing::warn!("move {} has no positions to match", mv.name());
        return None;
    }

    let total_time = last_sample.timestamp - first_sample.timestamp;
    let mut first_max_dt = (max_dt * mv.len() as i64).max(1);
    let first = loop {
        if let Some(fit) = best_fit(history, 0, 0, first_max_dt, mv.position_at(0)) {
            break fit;
        }
        if first_max_dt >= total_time {
            tracing::warn!(
                "first position of {} not found within {} ms",
                mv.name(),
                total_time
            );
            return None;
        }
        first_max_dt = (first_max_dt * 6 / 5).max(first_max_dt + 1);
    };

    let mut frames = vec![first.index];
    let mut errors = vec![first.error];
    let mut deltas = Vec::new();
    let mut positions = vec![DetectedPosition::bind(
        first,
        Arc::clone(mv.position_at(0)),
        history,
    )];

    let end_of_history = last_sample.timestamp;
    let searchable = |i: usize| i < history.len() && history[i].timestamp + min_dt < end_of_history;

    let mut prev = first.start;
    let mut i = first.index;
    let mut beat = 1;
    while searchable(i) {
        let mut next = None;
        while next.is_none() && searchable(i) {
            next = best_fit_beat(history, i, mv, beat, min_dt, max_dt);
            i += 1;
        }
        let Some(next) = next else {
            break;
        };

        errors.push(next.error);
        deltas.push(next.start - prev);
        frames.push(next.index);
        positions.push(DetectedPosition::bind(
            next,
            Arc::clone(mv.position_at(beat)),
            history,
        ));

        prev = next.start;
        // never search the same sample twice
        i = next.index.max(i);
        beat += 1;
    }

    let average_error = errors.iter().sum::<f64>() / errors.len() as f64;
    tracing::debug!(
        "matched {} beats of {}, average error {:.3}",
        frames.len(),
        mv.name(),
        average_error
    );

    Some(MatchResult {
        offset_ms: first.start - first_sample.timestamp,
        start: first.start,
        num_moves: frames.len(),
        average_error,
        frames,
        errors,
        deltas,
        positions,
    })
}
