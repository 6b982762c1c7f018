//! Moves: cyclic sequences of positions, one per beat.

use std::str::FromStr;
use std::sync::Arc;

use groove_core::{BodyPose, Error, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::position::{NamedPosition, PoseErrors};
use crate::steps::StepPattern;
use crate::ERROR_SCALE;

/// A choreography the dancer repeats in lock-step with the beat.
///
/// Beat `i` expects `on_beat[i % len]`. Never empty.
#[derive(Debug, Clone)]
pub struct Move {
    name: String,
    on_beat: Vec<Arc<NamedPosition>>,
    steps: Vec<StepPattern>,
}

impl Move {
    pub fn builder<'a>(name: impl Into<String>, catalog: &'a Catalog) -> MoveBuilder<'a> {
        MoveBuilder {
            catalog,
            name: name.into(),
            on_beat: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// Good for calibration.
    pub fn standing_straight() -> Self {
        let standing = NamedPosition::standing();
        Self {
            name: "Standing Straight".to_string(),
            steps: vec![StepPattern::new("Standing Straight", [standing.id.clone()])],
            on_beat: vec![Arc::new(standing)],
        }
    }

    /// The classic.
    pub fn running_man(catalog: &Catalog) -> Result<Self> {
        Move::builder("Running Man", catalog)
            .then("right-forward")?
            .then("left-up")?
            .then("left-forward")?
            .then("right-up")?
            .build()
    }

    pub fn double_running_man(catalog: &Catalog) -> Result<Self> {
        Move::builder("Double Running Man", catalog)
            .then("right-forward")?
            .then("left-up")?
            .then("right-forward")?
            .then("left-up")?
            .then("left-forward")?
            .then("right-up")?
            .then("left-forward")?
            .then("right-up")?
            .build()
    }

    pub fn reverse_running_man(catalog: &Catalog) -> Result<Self> {
        Move::builder("Reverse Running Man", catalog)
            .then("right-forward")?
            .then("right-up")?
            .then("left-forward")?
            .then("left-up")?
            .build()
    }

    pub fn double_turn_running_man(catalog: &Catalog) -> Result<Self> {
        Move::builder("Double Turn Running Man", catalog)
            // normal
            .then("right-forward")?
            .then("left-up")?
            .then("left-forward")?
            .then("right-up")?
            // double
            .then("left-forward")?
            .then("right-up")?
            // turn
            .then("right-forward")?
            .then("left-up")?
            // normal, starting left
            .then("left-forward")?
            .then("right-up")?
            // double
            .then("right-forward")?
            .then("left-up")?
            .then("right-forward")?
            .then("left-up")?
            // turn
            .then("left-forward")?
            .then("right-up")?
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.on_beat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.on_beat.is_empty()
    }

    pub fn on_beat(&self) -> &[Arc<NamedPosition>] {
        &self.on_beat
    }

    /// One pattern per move, named after it, covering a whole cycle
    pub fn steps(&self) -> &[StepPattern] {
        &self.steps
    }

    /// Position expected on `beat`, wrapping around the cycle
    pub fn position_at(&self, beat: usize) -> &Arc<NamedPosition> {
        &self.on_beat[beat % self.on_beat.len()]
    }

    /// Scaled error of `pose` against the position expected on `beat`
    pub fn error_score(&self, pose: &BodyPose, beat: usize) -> f64 {
        self.position_at(beat).error_score(pose) / ERROR_SCALE
    }

    pub fn error_scores(&self, pose: &BodyPose, beat: usize) -> PoseErrors {
        self.position_at(beat).error_scores(pose)
    }

    pub fn diff(&self, pose: &BodyPose, beat: usize) -> BodyPose {
        self.position_at(beat).diff(pose)
    }
}

/// Accumulates positions for a [`Move`], one `then` per beat
pub struct MoveBuilder<'a> {
    catalog: &'a Catalog,
    name: String,
    on_beat: Vec<Arc<NamedPosition>>,
    ids: Vec<String>,
}

impl<'a> MoveBuilder<'a> {
    pub fn then(mut self, position_id: &str) -> Result<Self> {
        let position = self.catalog.require(position_id)?;
        self.ids.push(position.id.clone());
        self.on_beat.push(position);
        Ok(self)
    }

    pub fn build(self) -> Result<Move> {
        if self.on_beat.is_empty() {
            return Err(Error::EmptyMove(self.name));
        }
        Ok(Move {
            steps: vec![StepPattern::new(self.name.clone(), self.ids)],
            name: self.name,
            on_beat: self.on_beat,
        })
    }
}

/// What the dancer practices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    RunningMan,
    DoubleRunningMan,
    ReverseRunningMan,
    DoubleTurnRunningMan,
    /// No fixed move, any known position is detected
    Freestyle,
}

impl MoveKind {
    pub const ALL: [MoveKind; 5] = [
        MoveKind::RunningMan,
        MoveKind::DoubleRunningMan,
        MoveKind::ReverseRunningMan,
        MoveKind::DoubleTurnRunningMan,
        MoveKind::Freestyle,
    ];

    /// `None` for freestyle
    pub fn build(&self, catalog: &Catalog) -> Result<Option<Move>> {
        let mv = match self {
            MoveKind::RunningMan => Move::running_man(catalog)?,
            MoveKind::DoubleRunningMan => Move::double_running_man(catalog)?,
            MoveKind::ReverseRunningMan => Move::reverse_running_man(catalog)?,
            MoveKind::DoubleTurnRunningMan => Move::double_turn_running_man(catalog)?,
            MoveKind::Freestyle => return Ok(None),
        };
        Ok(Some(mv))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::RunningMan => "running-man",
            MoveKind::DoubleRunningMan => "double-running-man",
            MoveKind::ReverseRunningMan => "reverse-running-man",
            MoveKind::DoubleTurnRunningMan => "double-turn-running-man",
            MoveKind::Freestyle => "freestyle",
        }
    }
}

impl FromStr for MoveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MoveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown move {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::FacingDirection;

    #[test]
    fn test_cyclic_lookup() {
        let catalog = Catalog::running_man();
        let mv = Move::running_man(&catalog).unwrap();
        assert_eq!(mv.len(), 4);
        assert_eq!(mv.position_at(0).id, "right-forward");
        assert_eq!(mv.position_at(3).id, "right-up");
        assert_eq!(mv.position_at(4).id, "right-forward");
        assert_eq!(mv.position_at(9).id, "left-up");
    }

    #[test]
    fn test_move_step_pattern() {
        let catalog = Catalog::running_man();
        let mv = Move::reverse_running_man(&catalog).unwrap();
        assert_eq!(mv.steps().len(), 1);
        assert_eq!(mv.steps()[0].name, "Reverse Running Man");
        assert_eq!(
            mv.steps()[0].positions,
            ["right-forward", "right-up", "left-forward", "left-up"]
        );
    }

    #[test]
    fn test_builder_errors() {
        let catalog = Catalog::running_man();
        assert!(matches!(
            Move::builder("Nothing", &catalog).build(),
            Err(Error::EmptyMove(_))
        ));
        assert!(matches!(
            Move::builder("Kick", &catalog).then("kick"),
            Err(Error::UnknownPosition(_))
        ));
    }

    #[test]
    fn test_error_score_is_scaled() {
        let catalog = Catalog::running_man();
        let mv = Move::running_man(&catalog).unwrap();
        let pose = BodyPose::default();
        let raw = mv.position_at(0).error_score(&pose);
        assert!(raw > 0.0);
        assert!((mv.error_score(&pose, 4) - raw / ERROR_SCALE).abs() < 1e-12);
        assert!((mv.error_scores(&pose, 0).total() - raw).abs() < 1e-9);

        let perfect = mv.position_at(1).center_pose(FacingDirection::Left);
        assert_eq!(mv.error_score(&perfect, 1), 0.0);
    }

    #[test]
    fn test_move_kinds() {
        let catalog = Catalog::running_man();
        assert!(MoveKind::Freestyle.build(&catalog).unwrap().is_none());
        let double_turn = MoveKind::DoubleTurnRunningMan.build(&catalog).unwrap().unwrap();
        assert_eq!(double_turn.len(), 16);
        assert_eq!(
            "double-running-man".parse::<MoveKind>().unwrap(),
            MoveKind::DoubleRunningMan
        );
        assert!("salsa".parse::<MoveKind>().is_err());
        assert_eq!(Move::standing_straight().len(), 1);
    }
}
