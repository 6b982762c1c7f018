//! Fundamental types for the dance analysis crates.

use std::ops::{Add, Sub};

use chrono::{DateTime, Utc};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of one practice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Epoch timestamp with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Wall-clock time, the epoch itself when out of chrono's range
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

/// Shift a timestamp by a number of milliseconds
impl Add<i64> for Timestamp {
    type Output = Timestamp;

    fn add(self, millis: i64) -> Timestamp {
        Timestamp(self.0 + millis)
    }
}

/// Milliseconds elapsed between two timestamps
impl Sub for Timestamp {
    type Output = i64;

    fn sub(self, other: Timestamp) -> i64 {
        self.0 - other.0
    }
}

/// 3D keypoint position as reported by the detector.
///
/// x grows to the right of the image, y grows downwards and z grows away
/// from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.to_nalgebra(), &other.to_nalgebra())
    }

    /// Same point seen in a horizontally flipped image
    pub fn mirrored(&self) -> Self {
        Self::new(-self.x, self.y, self.z)
    }
}

/// 33-landmark BlazePose keypoint layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Keypoint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Keypoint {
    pub const COUNT: usize = 33;

    pub const ALL: [Keypoint; Keypoint::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The same joint on the other side of the body. The nose maps to itself.
    pub fn opposite(self) -> Self {
        match self {
            Self::Nose => Self::Nose,
            // left and right landmarks alternate after the nose, except for
            // the eyes which come in groups of three
            Self::LeftEyeInner => Self::RightEyeInner,
            Self::LeftEye => Self::RightEye,
            Self::LeftEyeOuter => Self::RightEyeOuter,
            Self::RightEyeInner => Self::LeftEyeInner,
            Self::RightEye => Self::LeftEye,
            Self::RightEyeOuter => Self::LeftEyeOuter,
            other => {
                let idx = other as u8;
                let twin = if idx % 2 == 1 { idx + 1 } else { idx - 1 };
                Self::ALL[twin as usize]
            }
        }
    }
}

/// Keypoints of one leg, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegKeypoints {
    pub hip: Keypoint,
    pub knee: Keypoint,
    pub ankle: Keypoint,
}

impl LegKeypoints {
    pub const LEFT: LegKeypoints = LegKeypoints {
        hip: Keypoint::LeftHip,
        knee: Keypoint::LeftKnee,
        ankle: Keypoint::LeftAnkle,
    };

    pub const RIGHT: LegKeypoints = LegKeypoints {
        hip: Keypoint::RightHip,
        knee: Keypoint::RightKnee,
        ankle: Keypoint::RightAnkle,
    };
}

/// Keypoint detection with confidence score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeypointDetection {
    pub position: Position3D,
    pub confidence: f32,
}

impl KeypointDetection {
    pub fn new(position: Position3D, confidence: f32) -> Self {
        Self {
            position,
            confidence,
        }
    }
}

/// Complete skeleton with all 33 keypoints of one detected person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletalPose {
    keypoints: Vec<KeypointDetection>,
}

impl SkeletalPose {
    pub fn new(keypoints: Vec<KeypointDetection>) -> Result<Self> {
        if keypoints.len() != Keypoint::COUNT {
            return Err(Error::KeypointCount {
                expected: Keypoint::COUNT,
                actual: keypoints.len(),
            });
        }
        Ok(Self { keypoints })
    }

    pub fn get(&self, keypoint: Keypoint) -> &KeypointDetection {
        &self.keypoints[keypoint.index()]
    }

    pub fn position(&self, keypoint: Keypoint) -> Position3D {
        self.get(keypoint).position
    }

    pub fn keypoints(&self) -> &[KeypointDetection] {
        &self.keypoints
    }

    /// Flip the image horizontally: negate x and swap left and right labels.
    pub fn mirrored(&self) -> Self {
        let keypoints = Keypoint::ALL
            .iter()
            .map(|kp| {
                let source = self.get(kp.opposite());
                KeypointDetection::new(source.position.mirrored(), source.confidence)
            })
            .collect();
        Self { keypoints }
    }

    /// Per-keypoint distance travelled since `previous`
    pub fn movement_since(&self, previous: &SkeletalPose) -> Vec<f64> {
        self.keypoints
            .iter()
            .zip(previous.keypoints.iter())
            .map(|(now, before)| now.position.distance_to(&before.position))
            .collect()
    }
}
