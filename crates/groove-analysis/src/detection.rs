//! Free-form detection of any catalog position.

use std::sync::Arc;

use groove_core::{FacingDirection, Sample, Timestamp};
use groove_moves::{Catalog, NamedPosition};
use serde::Serialize;

use crate::config::MatchingConfig;
use crate::fit::{best_fit, Fit};

/// An observed instant classified as one of the catalog positions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedPosition {
    pub start: Timestamp,
    /// Index of the matching sample in the analyzed history
    pub index: usize,
    pub error: f64,
    /// Shared catalog template
    pub position: Arc<NamedPosition>,
    /// Direction the dancer actually faced in the matching sample
    pub facing_direction: FacingDirection,
}

impl DetectedPosition {
    /// Bind a template to the sample it was matched on.
    pub fn bind(fit: Fit, position: Arc<NamedPosition>, history: &[Sample]) -> Self {
        Self {
            start: fit.start,
            index: fit.index,
            error: fit.error,
            position,
            facing_direction: history[fit.index].body_pos.facing_direction,
        }
    }

    pub fn id(&self) -> &str {
        &self.position.id
    }
}

/// Scan `history` for whichever catalog position fits best, window by window.
///
/// At every scan position all catalog entries are searched in
/// `[t + min_dt, t + max_dt]` and the lowest error wins, ties going to the
/// earlier catalog entry. The scan then continues from the matched sample.
/// Windows without any sample are skipped in one go. Matches with an error
/// above `error_threshold` still advance the scan but are not reported.
///
/// # Panics
///
/// If `min_dt > max_dt`.
pub fn detect_any_positions(
    history: &[Sample],
    catalog: &Catalog,
    min_dt: i64,
    max_dt: i64,
    error_threshold: f64,
) -> Vec<DetectedPosition> {
    assert!(min_dt <= max_dt, "{min_dt} <= {max_dt}");
    let mut positions = Vec::new();
    let Some(last) = history.last() else {
        tracing::warn!("no positions to detect in an empty history");
        return positions;
    };
    let end = Timestamp::from_millis(last.timestamp.as_millis() - min_dt);

    let mut i = 0;
    while i < history.len() && history[i].timestamp <= end {
        // the very first window may start right after the first sample
        let window_min_dt = if i == 0 { min_dt.min(1) } else { min_dt };

        let mut best: Option<(Fit, &Arc<NamedPosition>)> = None;
        if history[i].timestamp + window_min_dt <= last.timestamp {
            for position in catalog.positions() {
                let Some(candidate) = best_fit(history, i, window_min_dt, max_dt, position)
                else {
                    continue;
                };
                if best.map_or(true, |(b, _)| candidate.error < b.error) {
                    best = Some((candidate, position));
                }
            }
        }

        match best {
            Some((fit, position)) => {
                if fit.error <= error_threshold {
                    positions.push(DetectedPosition::bind(fit, Arc::clone(position), history));
                }
                i = fit.index.max(i + 1);
            }
            None => {
                // not enough samples in the window, skip the dead zone
                let fast_forward_to = history[i].timestamp + (max_dt - min_dt);
                let before = i;
                while i < history.len() && history[i].timestamp < fast_forward_to {
                    i += 1;
                }
                if i == before {
                    i += 1;
                }
            }
        }
    }
    positions
}

/// Merge neighbouring detections of the same position.
///
/// Scanning right to left, of two adjacent detections with the same id that
/// start less than `min_dt_repeat` apart, the one with the higher error is
/// dropped. On equal errors the later one goes.
pub fn dedup_repeats(positions: &mut Vec<DetectedPosition>, min_dt_repeat: i64) {
    let mut i = positions.len();
    while i > 1 {
        i -= 1;
        let (prev, curr) = (&positions[i - 1], &positions[i]);
        if prev.id() != curr.id() || (curr.start - prev.start).abs() >= min_dt_repeat {
            continue;
        }
        if curr.error >= prev.error {
            positions.remove(i);
        } else {
            positions.remove(i - 1);
        }
    }
}

/// Free-form detection followed by repeat suppression
pub fn detect_positions(
    history: &[Sample],
    catalog: &Catalog,
    config: &MatchingConfig,
) -> Vec<DetectedPosition> {
    let mut positions = detect_any_positions(
        history,
        catalog,
        config.min_dt,
        config.max_dt,
        config.error_threshold,
    );
    let found = positions.len();
    dedup_repeats(&mut positions, config.min_dt_repeat);
    tracing::debug!(
        "found {} positions, de-duplicated to {}",
        found,
        positions.len()
    );
    positions
}
