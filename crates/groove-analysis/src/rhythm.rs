//! Tempo and phase estimation.
//!
//! Both estimators walk the history on an exact beat grid and blend the two
//! samples around every beat instant. The shape estimator compares the
//! blended pose against a move, the stillness estimator rewards feet that
//! rest on the beat.

use groove_core::{BodyPose, Keypoint, Sample};
use groove_moves::Move;
use serde::Serialize;

/// Ankle movement below this counts as standing still
const PERFECTLY_STILL: f64 = 0.1;
/// Ankle movement above this scores nothing
const MAX_MOVEMENT: f64 = 0.75;
/// Points per foot when perfectly still
const STILL_FOOT_POINTS: f64 = 50.0;

/// Best phase found for one tempo
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempoEstimate {
    pub bpm: f64,
    /// Time from the start of the history to the first beat (ms)
    pub offset_ms: i64,
    /// Mean per-beat score. An error for shape estimates (lower is better),
    /// points for stillness estimates (higher is better).
    pub score: f64,
    /// Number of beats that went into the score
    pub beats: usize,
}

/// One instant of the beat grid and the samples around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPoint {
    pub beat: usize,
    pub time_ms: f64,
    /// Last sample at or before the beat
    pub before: usize,
    /// First sample at or after the beat
    pub after: usize,
    /// Weight of `before`, the closer sample weighs more
    pub ratio: f64,
}

impl BeatPoint {
    pub fn pose(&self, history: &[Sample]) -> BodyPose {
        if self.before == self.after {
            return history[self.before].body_pos;
        }
        history[self.before]
            .body_pos
            .interpolate(&history[self.after].body_pos, self.ratio)
    }

    pub fn blend(&self, before: f64, after: f64) -> f64 {
        if self.before == self.after {
            return before;
        }
        before * self.ratio + after * (1.0 - self.ratio)
    }
}

/// Iterator over the beats at `start + k * beat_ms` that lie inside a history
pub struct BeatWalk<'a> {
    history: &'a [Sample],
    start_ms: f64,
    beat_ms: f64,
    beat: usize,
    cursor: usize,
}

impl<'a> BeatWalk<'a> {
    /// Start on the sample at index `start`.
    pub fn new(history: &'a [Sample], start: usize, beat_ms: f64) -> Self {
        Self {
            history,
            start_ms: history[start].timestamp.as_millis() as f64,
            beat_ms,
            beat: 0,
            cursor: start,
        }
    }
}

impl Iterator for BeatWalk<'_> {
    type Item = BeatPoint;

    fn next(&mut self) -> Option<BeatPoint> {
        let last = self.history.last()?.timestamp.as_millis() as f64;
        let time_ms = self.start_ms + self.beat as f64 * self.beat_ms;
        if time_ms > last {
            return None;
        }
        let history = self.history;
        let at = |i: usize| history[i].timestamp.as_millis() as f64;
        while self.cursor + 1 < history.len() && at(self.cursor + 1) <= time_ms {
            self.cursor += 1;
        }

        let before = self.cursor;
        let point = if at(before) >= time_ms {
            BeatPoint {
                beat: self.beat,
                time_ms,
                before,
                after: before,
                ratio: 1.0,
            }
        } else {
            let after = before + 1;
            let early = time_ms - at(before);
            let late = at(after) - time_ms;
            BeatPoint {
                beat: self.beat,
                time_ms,
                before,
                after,
                ratio: late / (early + late),
            }
        };
        self.beat += 1;
        Some(point)
    }
}

fn beat_duration(bpm: f64) -> Option<f64> {
    if bpm.is_finite() && bpm > 0.0 {
        Some(60_000.0 / bpm)
    } else {
        tracing::warn!("invalid tempo {} bpm", bpm);
        None
    }
}

/// Sample indices that can serve as the first beat: everything within one
/// beat of the history start
fn candidate_starts(history: &[Sample], beat_ms: f64) -> impl Iterator<Item = usize> + '_ {
    let first = history.first().map_or(0.0, |s| s.timestamp.as_millis() as f64);
    history
        .iter()
        .take_while(move |s| (s.timestamp.as_millis() as f64) < first + beat_ms)
        .enumerate()
        .map(|(i, _)| i)
}

/// How well the history follows `mv` at `bpm`, over every phase.
///
/// Lowest mean error wins. `None` for an empty history.
pub fn bpm_error(history: &[Sample], mv: &Move, bpm: f64) -> Option<TempoEstimate> {
    let first = history.first()?;
    let beat_ms = beat_duration(bpm)?;

    let mut best: Option<TempoEstimate> = None;
    for start in candidate_starts(history, beat_ms) {
        let (total, beats) = BeatWalk::new(history, start, beat_ms)
            .fold((0.0, 0), |(total, beats), point| {
                (total + mv.error_score(&point.pose(history), point.beat), beats + 1)
            });
        let score = total / beats as f64;
        if best.map_or(true, |b| score < b.score) {
            best = Some(TempoEstimate {
                bpm,
                offset_ms: history[start].timestamp - first.timestamp,
                score,
                beats,
            });
        }
    }
    best
}

/// The tempo among `candidates` at which the history follows `mv` best
pub fn estimate_tempo(history: &[Sample], mv: &Move, candidates: &[f64]) -> Option<TempoEstimate> {
    let best = candidates
        .iter()
        .filter_map(|&bpm| bpm_error(history, mv, bpm))
        .fold(None, |best: Option<TempoEstimate>, e| match best {
            Some(b) if b.score <= e.score => Some(b),
            _ if e.score.is_nan() => best,
            _ => Some(e),
        });
    if let Some(estimate) = &best {
        tracing::info!(
            "estimated {} at {} bpm, offset {} ms, error {:.3}",
            mv.name(),
            estimate.bpm,
            estimate.offset_ms,
            estimate.score
        );
    }
    best
}

fn foot_score(movement: f64) -> f64 {
    if movement < PERFECTLY_STILL {
        STILL_FOOT_POINTS
    } else if movement > MAX_MOVEMENT {
        0.0
    } else {
        STILL_FOOT_POINTS * (1.0 - (movement - PERFECTLY_STILL) / (MAX_MOVEMENT - PERFECTLY_STILL))
    }
}

/// 0 to 100 points for feet that do not move, the stiller foot counting twice.
///
/// Samples without movement data score 0.
pub fn stillness_score(sample: &Sample) -> f64 {
    let (Some(left), Some(right)) = (
        sample.movement_of(Keypoint::LeftAnkle),
        sample.movement_of(Keypoint::RightAnkle),
    ) else {
        return 0.0;
    };
    let left = foot_score(left);
    let right = foot_score(right);
    (left + right + 2.0 * left.max(right)) / 2.0
}

/// How still the feet are on the beats of `bpm`, for the best phase.
///
/// Highest mean score wins. `None` for an empty history.
pub fn on_beat_score(history: &[Sample], bpm: f64) -> Option<TempoEstimate> {
    let first = history.first()?;
    let beat_ms = beat_duration(bpm)?;

    let mut best: Option<TempoEstimate> = None;
    for start in candidate_starts(history, beat_ms) {
        let (total, beats) = BeatWalk::new(history, start, beat_ms)
            .fold((0.0, 0), |(total, beats), point| {
                let score = point.blend(
                    stillness_score(&history[point.before]),
                    stillness_score(&history[point.after]),
                );
                (total + score, beats + 1)
            });
        let score = total / beats as f64;
        if best.map_or(true, |b| score > b.score) {
            best = Some(TempoEstimate {
                bpm,
                offset_ms: history[start].timestamp - first.timestamp,
                score,
                beats,
            });
        }
    }
    best
}

/// The tempo among `candidates` with the stillest feet on the beat
pub fn estimate_tempo_by_stillness(history: &[Sample], candidates: &[f64]) -> Option<TempoEstimate> {
    let best = candidates
        .iter()
        .filter_map(|&bpm| on_beat_score(history, bpm))
        .fold(None, |best: Option<TempoEstimate>, e| match best {
            Some(b) if b.score >= e.score => Some(b),
            _ => Some(e),
        });
    if let Some(estimate) = &best {
        tracing::info!(
            "stillest feet at {} bpm, offset {} ms, score {:.1}",
            estimate.bpm,
            estimate.offset_ms,
            estimate.score
        );
    }
    best
}
