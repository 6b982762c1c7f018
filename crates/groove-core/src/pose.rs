//! Direction-normalized body pose derived from raw keypoints.

use serde::{Deserialize, Serialize};

use crate::geometry::{azimuth, signed_polar_angle};
use crate::types::{Keypoint, LegKeypoints, SkeletalPose};

/// Coarse direction the dancer's torso faces, seen from the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingDirection {
    Left,
    Right,
    Front,
    Back,
    #[default]
    Unknown,
}

impl FacingDirection {
    /// Classify from the azimuth of the left-to-right shoulder segment.
    ///
    /// Four 90° sectors with boundaries at ±45° and ±135°. `Unknown` only
    /// comes out of a non-finite azimuth.
    pub fn from_shoulder_azimuth(angle: f64) -> Self {
        if (-45.0..=45.0).contains(&angle) {
            FacingDirection::Left
        } else if angle > 45.0 && angle < 135.0 {
            FacingDirection::Back
        } else if angle <= -135.0 || angle >= 135.0 {
            FacingDirection::Right
        } else if angle < -45.0 && angle > -135.0 {
            FacingDirection::Front
        } else {
            FacingDirection::Unknown
        }
    }

    /// Sign applied to leg angles so "forward" is positive on either side.
    pub fn direction_correction(&self) -> f64 {
        match self {
            FacingDirection::Left => -1.0,
            _ => 1.0,
        }
    }

    pub fn mirrored(&self) -> Self {
        match self {
            FacingDirection::Left => FacingDirection::Right,
            FacingDirection::Right => FacingDirection::Left,
            other => *other,
        }
    }
}

/// Leg angles of a dancer at one instant, in degrees.
///
/// All zero when standing straight. Thighs and full legs are positive when
/// the leg swings forward, shins are measured relative to the thigh and are
/// positive when the knee is bent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyPose {
    pub left_thigh: f64,
    pub right_thigh: f64,
    pub left_shin: f64,
    pub right_shin: f64,
    pub left_full_leg: f64,
    pub right_full_leg: f64,
    pub facing_direction: FacingDirection,
}

impl BodyPose {
    pub fn standing(facing_direction: FacingDirection) -> Self {
        Self {
            facing_direction,
            ..Self::default()
        }
    }

    /// Leg angles of a detected skeleton.
    ///
    /// Mirroring the image of a dancer seen from the side gives the same pose
    /// with the legs exchanged. Facing the camera or turned away, the
    /// correction stays +1 on both images, so the mirrored pose also has
    /// every angle negated.
    pub fn from_keypoints(skeleton: &SkeletalPose) -> Self {
        // The shoulders are steadier than the hips for this: at the extreme
        // points of a running man the hip azimuth sits right on a sector
        // boundary.
        let shoulder_angle = azimuth(
            &skeleton.position(Keypoint::LeftShoulder),
            &skeleton.position(Keypoint::RightShoulder),
        );
        let facing_direction = FacingDirection::from_shoulder_azimuth(shoulder_angle);
        let correction = facing_direction.direction_correction();

        let (left_thigh, left_shin, left_full_leg) =
            leg_angles(skeleton, LegKeypoints::LEFT, correction);
        let (right_thigh, right_shin, right_full_leg) =
            leg_angles(skeleton, LegKeypoints::RIGHT, correction);

        Self {
            left_thigh,
            right_thigh,
            left_shin,
            right_shin,
            left_full_leg,
            right_full_leg,
            facing_direction,
        }
    }

    pub fn left_leg(mut self, thigh: f64, shin: f64, full_leg: f64) -> Self {
        self.left_thigh = thigh;
        self.left_shin = shin;
        self.left_full_leg = full_leg;
        self
    }

    pub fn right_leg(mut self, thigh: f64, shin: f64, full_leg: f64) -> Self {
        self.right_thigh = thigh;
        self.right_shin = shin;
        self.right_full_leg = full_leg;
        self
    }

    /// Linear blend, `ratio` is the weight of `self`.
    ///
    /// The facing direction is taken from `self`.
    pub fn interpolate(&self, other: &BodyPose, ratio: f64) -> BodyPose {
        let mix = |a: f64, b: f64| a * ratio + b * (1.0 - ratio);
        BodyPose {
            left_thigh: mix(self.left_thigh, other.left_thigh),
            right_thigh: mix(self.right_thigh, other.right_thigh),
            left_shin: mix(self.left_shin, other.left_shin),
            right_shin: mix(self.right_shin, other.right_shin),
            left_full_leg: mix(self.left_full_leg, other.left_full_leg),
            right_full_leg: mix(self.right_full_leg, other.right_full_leg),
            facing_direction: self.facing_direction,
        }
    }

    /// Per-field `self - other`, facing direction unknown.
    pub fn diff(&self, other: &BodyPose) -> BodyPose {
        BodyPose {
            left_thigh: self.left_thigh - other.left_thigh,
            right_thigh: self.right_thigh - other.right_thigh,
            left_shin: self.left_shin - other.left_shin,
            right_shin: self.right_shin - other.right_shin,
            left_full_leg: self.left_full_leg - other.left_full_leg,
            right_full_leg: self.right_full_leg - other.right_full_leg,
            facing_direction: FacingDirection::Unknown,
        }
    }

    /// Same pose with left and right legs exchanged
    pub fn swapped_sides(&self) -> BodyPose {
        BodyPose {
            left_thigh: self.right_thigh,
            right_thigh: self.left_thigh,
            left_shin: self.right_shin,
            right_shin: self.left_shin,
            left_full_leg: self.right_full_leg,
            right_full_leg: self.left_full_leg,
            facing_direction: self.facing_direction.mirrored(),
        }
    }
}

/// (thigh, shin, full leg) for one leg
fn leg_angles(skeleton: &SkeletalPose, leg: LegKeypoints, correction: f64) -> (f64, f64, f64) {
    let hip = skeleton.position(leg.hip);
    let knee = skeleton.position(leg.knee);
    let ankle = skeleton.position(leg.ankle);

    let thigh = correction * signed_polar_angle(&hip, &knee);
    let full_leg = correction * signed_polar_angle(&hip, &ankle);
    let shin = thigh - correction * signed_polar_angle(&knee, &ankle);
    (thigh, shin, full_leg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KeypointDetection, Position3D};

    /// Side view skeleton facing the right of the image
    fn skeleton(right_knee: Position3D, right_ankle: Position3D) -> SkeletalPose {
        let mut keypoints = vec![KeypointDetection::new(Position3D::origin(), 0.9); Keypoint::COUNT];
        let mut set = |kp: Keypoint, pos: Position3D| {
            keypoints[kp.index()] = KeypointDetection::new(pos, 0.9);
        };
        // right shoulder closer to the camera than the left one
        set(Keypoint::LeftShoulder, Position3D::new(0.0, -0.5, 0.1));
        set(Keypoint::RightShoulder, Position3D::new(0.0, -0.5, -0.1));
        set(Keypoint::LeftHip, Position3D::new(0.0, 0.0, 0.1));
        set(Keypoint::RightHip, Position3D::new(0.0, 0.0, -0.1));
        set(Keypoint::LeftKnee, Position3D::new(0.0, 0.5, 0.1));
        set(Keypoint::LeftAnkle, Position3D::new(0.0, 1.0, 0.1));
        set(Keypoint::RightKnee, right_knee);
        set(Keypoint::RightAnkle, right_ankle);
        SkeletalPose::new(keypoints).unwrap()
    }

    #[test]
    fn test_standing_straight_is_zero() {
        let sk = skeleton(Position3D::new(0.0, 0.5, -0.1), Position3D::new(0.0, 1.0, -0.1));
        let pose = BodyPose::from_keypoints(&sk);
        assert_eq!(pose.facing_direction, FacingDirection::Right);
        for v in [
            pose.left_thigh,
            pose.right_thigh,
            pose.left_shin,
            pose.right_shin,
            pose.left_full_leg,
            pose.right_full_leg,
        ] {
            assert!(v.abs() < 1e-9);
        }
    }

    #[test]
    fn test_bent_forward_leg() {
        // thigh 45° forward, shin hanging straight down
        let sk = skeleton(Position3D::new(0.5, 0.5, -0.1), Position3D::new(0.5, 1.0, -0.1));
        let pose = BodyPose::from_keypoints(&sk);
        assert!((pose.right_thigh - 45.0).abs() < 1e-9);
        assert!((pose.right_shin - 45.0).abs() < 1e-9);
        assert!(pose.right_full_leg > 0.0 && pose.right_full_leg < 45.0);
    }

    #[test]
    fn test_mirrored_skeleton_swaps_legs() {
        let sk = skeleton(Position3D::new(0.5, 0.4, -0.1), Position3D::new(0.1, 0.9, -0.1));
        let pose = BodyPose::from_keypoints(&sk);
        let mirrored = BodyPose::from_keypoints(&sk.mirrored());

        assert_eq!(mirrored.facing_direction, FacingDirection::Left);
        let expected = pose.swapped_sides();
        assert_eq!(mirrored.facing_direction, expected.facing_direction);
        assert!((mirrored.left_thigh - expected.left_thigh).abs() < 1e-9);
        assert!((mirrored.right_thigh - expected.right_thigh).abs() < 1e-9);
        assert!((mirrored.left_shin - expected.left_shin).abs() < 1e-9);
        assert!((mirrored.right_shin - expected.right_shin).abs() < 1e-9);
        assert!((mirrored.left_full_leg - expected.left_full_leg).abs() < 1e-9);
        assert!((mirrored.right_full_leg - expected.right_full_leg).abs() < 1e-9);
    }

    #[test]
    fn test_mirrored_front_view_negates_angles() {
        let mut keypoints = vec![KeypointDetection::new(Position3D::origin(), 0.9); Keypoint::COUNT];
        let mut set = |kp: Keypoint, x: f64, y: f64| {
            keypoints[kp.index()] = KeypointDetection::new(Position3D::new(x, y, 0.0), 0.9);
        };
        // facing the camera, the left shoulder shows on the right of the image
        set(Keypoint::LeftShoulder, 0.2, -0.5);
        set(Keypoint::RightShoulder, -0.2, -0.5);
        set(Keypoint::LeftHip, 0.2, 0.0);
        set(Keypoint::LeftKnee, 0.45, 0.5);
        set(Keypoint::LeftAnkle, 0.45, 1.0);
        set(Keypoint::RightHip, -0.2, 0.0);
        set(Keypoint::RightKnee, -0.2, 0.5);
        set(Keypoint::RightAnkle, -0.2, 1.0);
        let sk = SkeletalPose::new(keypoints).unwrap();

        let pose = BodyPose::from_keypoints(&sk);
        assert_eq!(pose.facing_direction, FacingDirection::Front);
        assert!((pose.left_thigh - 26.565).abs() < 1e-3);

        let mirrored = BodyPose::from_keypoints(&sk.mirrored());
        let expected = pose.swapped_sides();
        assert_eq!(mirrored.facing_direction, FacingDirection::Front);
        assert_eq!(expected.facing_direction, FacingDirection::Front);
        assert!((mirrored.right_thigh + 26.565).abs() < 1e-3);
        for (got, want) in [
            (mirrored.left_thigh, expected.left_thigh),
            (mirrored.right_thigh, expected.right_thigh),
            (mirrored.left_shin, expected.left_shin),
            (mirrored.right_shin, expected.right_shin),
            (mirrored.left_full_leg, expected.left_full_leg),
            (mirrored.right_full_leg, expected.right_full_leg),
        ] {
            assert!((got + want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_facing_sectors() {
        assert_eq!(FacingDirection::from_shoulder_azimuth(0.0), FacingDirection::Left);
        assert_eq!(FacingDirection::from_shoulder_azimuth(45.0), FacingDirection::Left);
        assert_eq!(FacingDirection::from_shoulder_azimuth(90.0), FacingDirection::Back);
        assert_eq!(FacingDirection::from_shoulder_azimuth(135.0), FacingDirection::Right);
        assert_eq!(FacingDirection::from_shoulder_azimuth(-180.0), FacingDirection::Right);
        assert_eq!(FacingDirection::from_shoulder_azimuth(-90.0), FacingDirection::Front);
        assert_eq!(FacingDirection::from_shoulder_azimuth(f64::NAN), FacingDirection::Unknown);
    }

    #[test]
    fn test_interpolate_and_diff() {
        let a = BodyPose::standing(FacingDirection::Right).right_leg(40.0, 20.0, 10.0);
        let b = BodyPose::standing(FacingDirection::Left).right_leg(0.0, 0.0, 0.0);
        let mid = a.interpolate(&b, 0.25);
        assert!((mid.right_thigh - 10.0).abs() < 1e-12);
        assert!((mid.right_shin - 5.0).abs() < 1e-12);
        assert_eq!(mid.facing_direction, FacingDirection::Right);

        let d = a.diff(&b);
        assert!((d.right_thigh - 40.0).abs() < 1e-12);
        assert_eq!(d.left_thigh, 0.0);
    }
}
