//! Named reference positions.

use groove_core::{add_2d_vector, BodyPose, FacingDirection};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::range::Range;

pub const TINY_TOLERANCE: f64 = 2.5;
pub const SMALL_TOLERANCE: f64 = 5.0;
pub const MEDIUM_TOLERANCE: f64 = 10.0;
pub const BIG_TOLERANCE: f64 = 15.0;
pub const HUGE_TOLERANCE: f64 = 20.0;

/// Description of how a position *should* be.
///
/// Immutable template. Detections refer to it through an `Arc` and carry the
/// observed facing direction next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPosition {
    pub id: String,
    pub name: String,
    /// Asset key of the illustration shown for this position
    pub image: String,
    pub left_thigh: Range,
    pub right_thigh: Range,
    pub left_shin: Range,
    pub right_shin: Range,
    pub left_full_leg: Range,
    pub right_full_leg: Range,
}

/// Per-component error of a pose against a [`NamedPosition`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseErrors {
    pub left_thigh: f64,
    pub right_thigh: f64,
    pub left_shin: f64,
    pub right_shin: f64,
    pub left_full_leg: f64,
    pub right_full_leg: f64,
}

impl PoseErrors {
    pub fn total(&self) -> f64 {
        self.left_thigh
            + self.right_thigh
            + self.left_shin
            + self.right_shin
            + self.left_full_leg
            + self.right_full_leg
    }
}

/// Hip, knee and ankle of one leg in image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPoints {
    pub hip: Point2<f64>,
    pub knee: Point2<f64>,
    pub ankle: Point2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLengths {
    pub thigh: f64,
    pub shin: f64,
}

impl NamedPosition {
    /// A position with every angle at zero ± [`BIG_TOLERANCE`]
    pub fn new(id: impl Into<String>, name: impl Into<String>, image: impl Into<String>) -> Self {
        let zero = Range::with_tolerance(0.0, BIG_TOLERANCE, 1.0);
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            left_thigh: zero,
            right_thigh: zero,
            left_shin: zero,
            right_shin: zero,
            left_full_leg: zero,
            right_full_leg: zero,
        }
    }

    pub fn standing() -> Self {
        Self::new("standing", "Standing Straight", "standing")
    }

    /// Set the ranges of the left leg: `angles` and `weights` are
    /// (thigh, shin, full leg).
    pub fn left_leg(mut self, angles: [f64; 3], tolerance: f64, weights: [f64; 3]) -> Self {
        self.left_thigh = Range::with_tolerance(angles[0], tolerance, weights[0]);
        self.left_shin = Range::with_tolerance(angles[1], tolerance, weights[1]);
        self.left_full_leg = Range::with_tolerance(angles[2], tolerance, weights[2]);
        self
    }

    /// Same as [`NamedPosition::left_leg`] for the right leg.
    pub fn right_leg(mut self, angles: [f64; 3], tolerance: f64, weights: [f64; 3]) -> Self {
        self.right_thigh = Range::with_tolerance(angles[0], tolerance, weights[0]);
        self.right_shin = Range::with_tolerance(angles[1], tolerance, weights[1]);
        self.right_full_leg = Range::with_tolerance(angles[2], tolerance, weights[2]);
        self
    }

    /// Raw (unscaled) error of a pose, the sum of all six range errors
    pub fn error_score(&self, pose: &BodyPose) -> f64 {
        self.error_scores(pose).total()
    }

    pub fn error_scores(&self, pose: &BodyPose) -> PoseErrors {
        PoseErrors {
            left_thigh: self.left_thigh.error_score(pose.left_thigh),
            right_thigh: self.right_thigh.error_score(pose.right_thigh),
            left_shin: self.left_shin.error_score(pose.left_shin),
            right_shin: self.right_shin.error_score(pose.right_shin),
            left_full_leg: self.left_full_leg.error_score(pose.left_full_leg),
            right_full_leg: self.right_full_leg.error_score(pose.right_full_leg),
        }
    }

    /// How far each angle of `pose` has to move to get into range
    pub fn diff(&self, pose: &BodyPose) -> BodyPose {
        BodyPose {
            left_thigh: self.left_thigh.diff(pose.left_thigh),
            right_thigh: self.right_thigh.diff(pose.right_thigh),
            left_shin: self.left_shin.diff(pose.left_shin),
            right_shin: self.right_shin.diff(pose.right_shin),
            left_full_leg: self.left_full_leg.diff(pose.left_full_leg),
            right_full_leg: self.right_full_leg.diff(pose.right_full_leg),
            facing_direction: FacingDirection::Unknown,
        }
    }

    /// The pose in the middle of every range
    pub fn center_pose(&self, facing_direction: FacingDirection) -> BodyPose {
        BodyPose::standing(facing_direction)
            .left_leg(
                self.left_thigh.center(),
                self.left_shin.center(),
                self.left_full_leg.center(),
            )
            .right_leg(
                self.right_thigh.center(),
                self.right_shin.center(),
                self.right_full_leg.center(),
            )
    }

    /// Draw both legs of the ideal position from the given hips.
    ///
    /// Full-leg ranges are ignored, the ankle follows from thigh and shin.
    /// Returns (left, right).
    pub fn to_keypoints(
        &self,
        left_hip: Point2<f64>,
        right_hip: Point2<f64>,
        left_lengths: SegmentLengths,
        right_lengths: SegmentLengths,
        facing_direction: FacingDirection,
    ) -> (LegPoints, LegPoints) {
        let correction = facing_direction.direction_correction();
        let leg = |hip: Point2<f64>, thigh: &Range, shin: &Range, lengths: SegmentLengths| {
            let thigh_angle = thigh.center() * correction;
            let shin_angle = (thigh.center() - shin.center()) * correction;
            let knee = add_2d_vector(hip, thigh_angle, lengths.thigh);
            let ankle = add_2d_vector(knee, shin_angle, lengths.shin);
            LegPoints { hip, knee, ankle }
        };
        (
            leg(left_hip, &self.left_thigh, &self.left_shin, left_lengths),
            leg(right_hip, &self.right_thigh, &self.right_shin, right_lengths),
        )
    }
}
