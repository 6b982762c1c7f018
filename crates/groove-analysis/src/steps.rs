//! Greedy grouping of detected positions into steps.

use groove_core::Timestamp;
use groove_moves::StepPattern;
use serde::Serialize;

use crate::detection::DetectedPosition;

/// A run of detected positions matching one step pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub name: String,
    /// Start of the first position
    pub start: Timestamp,
    /// Start of the last position
    pub end: Timestamp,
    /// Error of every position in the step, in order
    pub errors: Vec<f64>,
    /// Star rating, set by the scoring pass
    pub stars: Option<u8>,
}

/// Audio feedback cue for a finished step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepFeedback {
    Success,
    Bad,
}

impl Step {
    pub fn mean_error(&self) -> f64 {
        if self.errors.is_empty() {
            return 0.0;
        }
        self.errors.iter().sum::<f64>() / self.errors.len() as f64
    }

    /// `Bad` once the mean error exceeds `threshold`
    pub fn feedback(&self, threshold: f64) -> StepFeedback {
        if self.mean_error() > threshold {
            StepFeedback::Bad
        } else {
            StepFeedback::Success
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end - self.start
    }
}

/// Split `positions` into steps.
///
/// At every position the patterns are tried in order and the first one that
/// matches consumes its positions. A position no pattern starts with is
/// skipped. There is no backtracking.
pub fn detect_steps(positions: &[DetectedPosition], patterns: &[StepPattern]) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut i = 0;
    while i < positions.len() {
        let rest = &positions[i..];
        let matched = patterns.iter().find(|pattern| {
            !pattern.is_empty()
                && pattern.len() <= rest.len()
                && pattern
                    .positions
                    .iter()
                    .zip(rest)
                    .all(|(id, detected)| detected.id() == id)
        });

        match matched {
            Some(pattern) => {
                let run = &rest[..pattern.len()];
                steps.push(Step {
                    name: pattern.name.clone(),
                    start: run[0].start,
                    end: run[run.len() - 1].start,
                    errors: run.iter().map(|p| p.error).collect(),
                    stars: None,
                });
                i += pattern.len();
            }
            None => i += 1,
        }
    }
    steps
}
