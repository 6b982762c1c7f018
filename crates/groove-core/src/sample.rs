//! Tracked samples and the append-only pose history.

use serde::{Deserialize, Serialize};

use crate::pose::BodyPose;
use crate::types::{Keypoint, SkeletalPose, Timestamp};

/// One tracked instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    /// Raw detector output. Absent for synthetic samples.
    pub keypoints: Option<SkeletalPose>,
    pub body_pos: BodyPose,
    /// Per-keypoint distance travelled since the previous sample
    pub movement: Option<Vec<f64>>,
}

impl Sample {
    /// Derive pose and movement for a freshly tracked skeleton.
    pub fn track(timestamp: Timestamp, skeleton: SkeletalPose, previous: Option<&Sample>) -> Self {
        let body_pos = BodyPose::from_keypoints(&skeleton);
        let movement = previous
            .and_then(|prev| prev.keypoints.as_ref())
            .map(|prev| skeleton.movement_since(prev));

        Self {
            timestamp,
            keypoints: Some(skeleton),
            body_pos,
            movement,
        }
    }

    /// Sample carrying only a pose, no keypoints and no movement
    pub fn from_pose(timestamp: Timestamp, body_pos: BodyPose) -> Self {
        Self {
            timestamp,
            keypoints: None,
            body_pos,
            movement: None,
        }
    }

    pub fn with_movement(mut self, movement: Vec<f64>) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn movement_of(&self, keypoint: Keypoint) -> Option<f64> {
        self.movement
            .as_ref()
            .and_then(|m| m.get(keypoint.index()).copied())
    }
}

/// Time between the first and the last sample, in milliseconds
pub fn history_duration(history: &[Sample]) -> i64 {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0,
    }
}

/// Samples at or after `since`, copied out of a possibly still growing history
pub fn snapshot_since(history: &[Sample], since: Timestamp) -> Vec<Sample> {
    history
        .iter()
        .filter(|s| s.timestamp >= since)
        .cloned()
        .collect()
}
