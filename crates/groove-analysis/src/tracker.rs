//! Live practice session: owns the growing pose history.

use std::sync::Arc;

use groove_core::{
    snapshot_since, Error, KeypointDetection, Result, Sample, SessionId, SkeletalPose, Timestamp,
};
use groove_moves::{Catalog, Move, MoveKind, StepPattern};
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::GrooveConfig;
use crate::detection::DetectedPosition;
use crate::pipeline::compute_positions;
use crate::rhythm::{estimate_tempo, estimate_tempo_by_stillness, TempoEstimate};
use crate::scoring::{rate_steps, reject_provisional, session_rating};
use crate::steps::{detect_steps, Step, StepFeedback};

/// Fewer samples than this say nothing about the tempo
const MIN_TEMPO_SAMPLES: usize = 2;

/// End-of-session result for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    pub move_kind: MoveKind,
    pub steps: Vec<Step>,
    /// Rounded mean star count, 0 to 5
    pub rating: u8,
}

/// Records pose samples of one dancer and analyzes them on demand.
///
/// Recording takes the write lock for a single push. Every analysis works on
/// a copy of the history taken under the read lock, so it never sees the
/// buffer grow underneath it.
pub struct Tracker {
    session_id: SessionId,
    started_at: Timestamp,
    catalog: Arc<Catalog>,
    kind: MoveKind,
    mv: Option<Move>,
    /// Patterns tried by the step detector, in priority order
    step_patterns: Vec<StepPattern>,
    config: GrooveConfig,
    history: RwLock<Vec<Sample>>,
}

impl Tracker {
    pub fn new(catalog: Arc<Catalog>, kind: MoveKind, config: GrooveConfig) -> Result<Self> {
        config.matching.validate()?;
        let mv = kind.build(&catalog)?;

        // a practiced move is recognized as a whole before its parts
        let mut step_patterns = mv.as_ref().map_or_else(Vec::new, |mv| mv.steps().to_vec());
        step_patterns.extend_from_slice(catalog.step_patterns());

        let session_id = SessionId::new();
        let started_at = Timestamp::now();
        tracing::info!(
            "session {} started at {}, practicing {}",
            session_id,
            started_at.to_datetime(),
            kind.as_str()
        );

        Ok(Self {
            session_id,
            started_at,
            catalog,
            kind,
            mv,
            step_patterns,
            config,
            history: RwLock::new(Vec::new()),
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Wall-clock time the session was created
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The practiced move, `None` in freestyle
    pub fn practiced_move(&self) -> Option<&Move> {
        self.mv.as_ref()
    }

    pub fn config(&self) -> &GrooveConfig {
        &self.config
    }

    pub fn step_patterns(&self) -> &[StepPattern] {
        &self.step_patterns
    }

    /// Record one detector result.
    ///
    /// Pose angles and per-keypoint movement since the previous sample are
    /// derived here.
    pub fn record(&self, timestamp: Timestamp, keypoints: Vec<KeypointDetection>) -> Result<()> {
        let skeleton = SkeletalPose::new(keypoints)?;
        let mut history = self.history.write();
        check_order(&history, timestamp)?;
        let sample = Sample::track(timestamp, skeleton, history.last());
        history.push(sample);
        Ok(())
    }

    /// Record an already tracked sample
    pub fn record_sample(&self, sample: Sample) -> Result<()> {
        let mut history = self.history.write();
        check_order(&history, sample.timestamp)?;
        history.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    pub fn clear(&self) {
        self.history.write().clear();
        tracing::debug!("session {} history cleared", self.session_id);
    }

    /// Copy of the history for review
    pub fn freeze(&self) -> Vec<Sample> {
        self.history.read().clone()
    }

    /// Copy of the samples at or after `since`
    pub fn freeze_since(&self, since: Timestamp) -> Vec<Sample> {
        snapshot_since(&self.history.read(), since)
    }

    pub fn positions(&self) -> Option<Vec<DetectedPosition>> {
        let history = self.freeze();
        self.positions_of(&history)
    }

    /// Rated steps of the whole history
    pub fn steps(&self) -> Vec<Step> {
        let history = self.freeze();
        let mut steps = self.steps_of(&history);
        rate_steps(&mut steps, &self.config.scoring);
        steps
    }

    /// Rated steps for live feedback.
    ///
    /// A last step that may still improve with more frames is left out.
    pub fn live_steps(&self) -> Vec<Step> {
        let history = self.freeze();
        let mut steps = self.steps_of(&history);
        if let Some(last) = history.last() {
            reject_provisional(
                &mut steps,
                last.timestamp,
                self.config.matching.lookahead_ms,
                self.config.scoring.perfect,
            );
        }
        rate_steps(&mut steps, &self.config.scoring);
        steps
    }

    /// Sound cue for a finished step
    pub fn feedback(&self, step: &Step) -> StepFeedback {
        step.feedback(self.config.scoring.bad_step_threshold)
    }

    pub fn summary(&self) -> SessionSummary {
        let steps = self.steps();
        let rating = session_rating(&steps);
        tracing::info!(
            "session {} finished with {} steps, rated {}",
            self.session_id,
            steps.len(),
            rating
        );
        SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            move_kind: self.kind,
            steps,
            rating,
        }
    }

    /// Tempo of the recorded dance among the configured candidates.
    ///
    /// Matches the pose shape of the practiced move, or the stillness of the
    /// feet in freestyle.
    pub fn estimate_tempo(&self) -> Result<Option<TempoEstimate>> {
        let history = self.freeze();
        if history.len() < MIN_TEMPO_SAMPLES {
            return Err(Error::InsufficientData {
                required: MIN_TEMPO_SAMPLES,
                available: history.len(),
            });
        }
        let candidates = &self.config.rhythm.candidate_bpms;
        Ok(match &self.mv {
            Some(mv) => estimate_tempo(&history, mv, candidates),
            None => estimate_tempo_by_stillness(&history, candidates),
        })
    }

    fn positions_of(&self, history: &[Sample]) -> Option<Vec<DetectedPosition>> {
        compute_positions(history, &self.catalog, self.mv.as_ref(), &self.config.matching)
    }

    fn steps_of(&self, history: &[Sample]) -> Vec<Step> {
        self.positions_of(history)
            .map(|positions| detect_steps(&positions, &self.step_patterns))
            .unwrap_or_default()
    }
}

fn check_order(history: &[Sample], timestamp: Timestamp) -> Result<()> {
    match history.last() {
        Some(last) if last.timestamp > timestamp => Err(Error::InvalidInput(format!(
            "sample at {} ms recorded after {} ms",
            timestamp.as_millis(),
            last.timestamp.as_millis()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::{BodyPose, FacingDirection, Keypoint, Position3D};

    fn new_tracker(kind: MoveKind) -> Tracker {
        Tracker::new(Arc::new(Catalog::running_man()), kind, GrooveConfig::default()).unwrap()
    }

    fn standing_keypoints(shift: f64) -> Vec<KeypointDetection> {
        let mut keypoints = vec![KeypointDetection::default(); Keypoint::COUNT];
        let mut set = |kp: Keypoint, y: f64, z: f64| {
            keypoints[kp.index()] = KeypointDetection::new(Position3D::new(shift, y, z), 0.9);
        };
        set(Keypoint::LeftShoulder, -0.5, 0.1);
        set(Keypoint::RightShoulder, -0.5, -0.1);
        for (hip, knee, ankle, z) in [
            (Keypoint::LeftHip, Keypoint::LeftKnee, Keypoint::LeftAnkle, 0.1),
            (Keypoint::RightHip, Keypoint::RightKnee, Keypoint::RightAnkle, -0.1),
        ] {
            set(hip, 0.0, z);
            set(knee, 0.45, z);
            set(ankle, 0.9, z);
        }
        keypoints
    }

    /// Running man at 400 ms per beat, the last position optionally sloppy
    fn perform(tracker: &Tracker, beats: usize, sloppy_end: bool) {
        let mv = tracker.practiced_move().unwrap().clone();
        for beat in 0..beats {
            let mut pose = mv.position_at(beat).center_pose(FacingDirection::Right);
            if sloppy_end && beat + 1 == beats {
                pose = pose.right_leg(25.0, 100.0, 0.0);
            }
            let sample = Sample::from_pose(Timestamp::from_millis(beat as i64 * 400), pose);
            tracker.record_sample(sample).unwrap();
        }
    }

    #[test]
    fn test_record_derives_pose_and_movement() {
        let tracker = new_tracker(MoveKind::Freestyle);
        tracker
            .record(Timestamp::from_millis(0), standing_keypoints(0.0))
            .unwrap();
        tracker
            .record(Timestamp::from_millis(33), standing_keypoints(0.2))
            .unwrap();

        let history = tracker.freeze();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].body_pos.facing_direction, FacingDirection::Right);
        assert!(history[0].body_pos.left_thigh.abs() < 1e-9);
        assert!(history[0].movement.is_none());
        let moved = history[1].movement_of(Keypoint::LeftAnkle).unwrap();
        assert!((moved - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_record_rejects_bad_input() {
        let tracker = new_tracker(MoveKind::Freestyle);
        assert!(matches!(
            tracker.record(Timestamp::from_millis(0), vec![KeypointDetection::default(); 17]),
            Err(Error::KeypointCount {
                expected: 33,
                actual: 17
            })
        ));
        tracker
            .record(Timestamp::from_millis(100), standing_keypoints(0.0))
            .unwrap();
        assert!(matches!(
            tracker.record(Timestamp::from_millis(50), standing_keypoints(0.0)),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_freeze_is_a_copy() {
        let tracker = new_tracker(MoveKind::RunningMan);
        perform(&tracker, 4, false);
        let frozen = tracker.freeze();
        tracker
            .record_sample(Sample::from_pose(Timestamp::from_millis(5_000), BodyPose::default()))
            .unwrap();
        assert_eq!(frozen.len(), 4);
        assert_eq!(tracker.len(), 5);
        assert_eq!(tracker.freeze_since(Timestamp::from_millis(800)).len(), 3);

        tracker.clear();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_move_pattern_comes_first() {
        let tracker = new_tracker(MoveKind::RunningMan);
        let names: Vec<&str> = tracker.step_patterns().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[0], "Running Man");
        assert_eq!(names.len(), 5);
        assert_eq!(new_tracker(MoveKind::Freestyle).step_patterns().len(), 4);
    }

    #[test]
    fn test_session_summary() {
        let tracker = new_tracker(MoveKind::RunningMan);
        perform(&tracker, 8, true);

        let summary = tracker.summary();
        assert_eq!(summary.session_id, tracker.session_id());
        assert_eq!(summary.started_at, tracker.started_at());
        assert!(summary.started_at <= Timestamp::now());
        assert_eq!(summary.move_kind, MoveKind::RunningMan);
        assert_eq!(summary.steps.len(), 2);
        assert!(summary.steps.iter().all(|s| s.name == "Running Man"));
        let stars: Vec<Option<u8>> = summary.steps.iter().map(|s| s.stars).collect();
        assert_eq!(stars, vec![Some(5), Some(4)]);
        assert_eq!(summary.rating, 5);
        assert_eq!(tracker.feedback(&summary.steps[1]), StepFeedback::Success);

        // the sloppy last step is still open while live
        let live = tracker.live_steps();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_clean_live_steps_are_final() {
        let tracker = new_tracker(MoveKind::RunningMan);
        perform(&tracker, 8, false);
        assert_eq!(tracker.live_steps(), tracker.steps());
        assert_eq!(tracker.positions().unwrap().len(), 8);
    }

    #[test]
    fn test_estimate_tempo() {
        let mut config = GrooveConfig::default();
        config.rhythm.candidate_bpms = vec![120.0, 150.0];
        let tracker =
            Tracker::new(Arc::new(Catalog::running_man()), MoveKind::RunningMan, config).unwrap();
        assert!(matches!(
            tracker.estimate_tempo(),
            Err(Error::InsufficientData { .. })
        ));
        perform(&tracker, 12, false);
        // 400 ms per beat
        let estimate = tracker.estimate_tempo().unwrap().unwrap();
        assert_eq!(estimate.bpm, 150.0);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GrooveConfig::default();
        config.matching.min_dt = 2_000;
        let result = Tracker::new(Arc::new(Catalog::running_man()), MoveKind::RunningMan, config);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
