//! Best-fit search of one target position inside a time window.

use groove_core::{Sample, Timestamp};
use groove_moves::{Move, NamedPosition, ERROR_SCALE};
use serde::Serialize;

/// Sample that matched a target best
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fit {
    /// Index into the searched history
    pub index: usize,
    pub start: Timestamp,
    /// Scaled error of the match
    pub error: f64,
}

/// Find the sample in `history` that best fits `target`.
///
/// Only samples with timestamps in
/// `[history[start] + min_dt, history[start] + max_dt]` are considered. On
/// equal errors the earliest sample wins. `None` if the window holds no
/// sample with a finite error.
///
/// # Panics
///
/// If `min_dt > max_dt`, `start` is out of bounds or there is no sample left
/// at or after `history[start] + min_dt`. These are caller bugs.
pub fn best_fit(
    history: &[Sample],
    start: usize,
    min_dt: i64,
    max_dt: i64,
    target: &NamedPosition,
) -> Option<Fit> {
    assert!(min_dt <= max_dt, "{min_dt} <= {max_dt}");
    assert!(start < history.len(), "{start} < {}", history.len());
    let origin = history[start].timestamp;
    let end_of_history = history[history.len() - 1].timestamp;
    assert!(
        origin + min_dt <= end_of_history,
        "no samples after start + min_dt ({} + {min_dt} > {})",
        origin.as_millis(),
        end_of_history.as_millis()
    );

    let window_start = origin + min_dt;
    let window_end = origin + max_dt;

    let mut best: Option<Fit> = None;
    for (index, sample) in history
        .iter()
        .enumerate()
        .skip(start)
        .take_while(|(_, s)| s.timestamp <= window_end)
    {
        if sample.timestamp < window_start {
            continue;
        }
        let error = target.error_score(&sample.body_pos) / ERROR_SCALE;
        if error < best.map_or(f64::INFINITY, |b| b.error) {
            best = Some(Fit {
                index,
                start: sample.timestamp,
                error,
            });
        }
    }
    best
}

/// [`best_fit`] against the position `mv` expects on `beat`
pub fn best_fit_beat(
    history: &[Sample],
    start: usize,
    mv: &Move,
    beat: usize,
    min_dt: i64,
    max_dt: i64,
) -> Option<Fit> {
    best_fit(history, start, min_dt, max_dt, mv.position_at(beat))
}
