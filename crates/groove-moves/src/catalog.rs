//! The catalog of known positions, steps and choreographies.

use std::sync::Arc;

use groove_core::{Error, Result};

use crate::position::{NamedPosition, HUGE_TOLERANCE, SMALL_TOLERANCE, TINY_TOLERANCE};
use crate::steps::{default_choreographies, default_step_patterns, Choreography, StepPattern};

/// Everything the analysis can recognize.
///
/// Built once at session start and shared by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    positions: Vec<Arc<NamedPosition>>,
    step_patterns: Vec<StepPattern>,
    choreographies: Vec<Choreography>,
}

impl Catalog {
    /// Every position id used by a step pattern must be in `positions`.
    pub fn new(
        positions: Vec<NamedPosition>,
        step_patterns: Vec<StepPattern>,
        choreographies: Vec<Choreography>,
    ) -> Result<Self> {
        let catalog = Self {
            positions: positions.into_iter().map(Arc::new).collect(),
            step_patterns: Vec::new(),
            choreographies,
        };
        catalog.with_step_patterns(step_patterns)
    }

    /// The four running man positions with the default steps.
    pub fn running_man() -> Self {
        // Thighs reach almost 90° in a perfect *-up position with the shin
        // around 130°. Chill versions must pass too, hence the huge tolerance
        // and low shin weight.
        let positions = vec![
            NamedPosition::new("right-up", "Right Leg Up", "between_steps")
                .right_leg([70.0, 100.0, 0.0], HUGE_TOLERANCE, [1.0, 0.2, 1.0])
                .left_leg([0.0, 0.0, 0.0], SMALL_TOLERANCE, [0.0, 0.0, 1.0]),
            NamedPosition::new("right-forward", "Right Leg Forward", "step_wide")
                .right_leg([40.0, 40.0, 10.0], TINY_TOLERANCE, [1.0; 3])
                .left_leg([-20.0, 5.0, -30.0], SMALL_TOLERANCE, [1.0; 3]),
            NamedPosition::new("left-up", "Left Leg Up", "between_steps")
                .left_leg([70.0, 100.0, 0.0], HUGE_TOLERANCE, [1.0, 0.2, 1.0])
                .right_leg([0.0, 0.0, 0.0], SMALL_TOLERANCE, [0.0, 0.0, 1.0]),
            NamedPosition::new("left-forward", "Left Leg Forward", "step_wide")
                .right_leg([-20.0, 5.0, -30.0], SMALL_TOLERANCE, [1.0; 3])
                .left_leg([40.0, 40.0, 10.0], TINY_TOLERANCE, [1.0; 3]),
        ];
        Self {
            positions: positions.into_iter().map(Arc::new).collect(),
            step_patterns: default_step_patterns(),
            choreographies: default_choreographies(),
        }
    }

    /// Replace the step patterns, checking that every id is known.
    pub fn with_step_patterns(mut self, step_patterns: Vec<StepPattern>) -> Result<Self> {
        for pattern in &step_patterns {
            if pattern.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "step pattern {} has no positions",
                    pattern.name
                )));
            }
            for id in &pattern.positions {
                self.require(id)?;
            }
        }
        self.step_patterns = step_patterns;
        Ok(self)
    }

    pub fn with_step_patterns_json(self, json: &str) -> Result<Self> {
        let patterns = StepPattern::list_from_json(json)?;
        self.with_step_patterns(patterns)
    }

    pub fn position(&self, id: &str) -> Option<&Arc<NamedPosition>> {
        let found = self.positions.iter().find(|p| p.id == id);
        if found.is_none() {
            tracing::warn!("unknown body position {}", id);
        }
        found
    }

    pub fn require(&self, id: &str) -> Result<Arc<NamedPosition>> {
        self.position(id)
            .cloned()
            .ok_or_else(|| Error::UnknownPosition(id.to_string()))
    }

    /// All positions in catalog order
    pub fn positions(&self) -> &[Arc<NamedPosition>] {
        &self.positions
    }

    /// Step patterns in matching priority
    pub fn step_patterns(&self) -> &[StepPattern] {
        &self.step_patterns
    }

    pub fn step_pattern(&self, name: &str) -> Option<&StepPattern> {
        self.step_patterns.iter().find(|p| p.name == name)
    }

    pub fn choreographies(&self) -> &[Choreography] {
        &self.choreographies
    }

    pub fn choreography(&self, name: &str) -> Option<&Choreography> {
        self.choreographies.iter().find(|c| c.name == name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::running_man()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::FacingDirection;

    #[test]
    fn test_running_man_catalog() {
        let catalog = Catalog::running_man();
        let ids: Vec<&str> = catalog.positions().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["right-up", "right-forward", "left-up", "left-forward"]);
        assert_eq!(catalog.step_patterns().len(), 4);
        assert!(catalog.choreography("Turn and Run").is_some());
    }

    #[test]
    fn test_positions_are_distinguishable() {
        let catalog = Catalog::running_man();
        for target in catalog.positions() {
            let pose = target.center_pose(FacingDirection::Right);
            assert_eq!(target.error_score(&pose), 0.0);
            for other in catalog.positions().iter().filter(|p| p.id != target.id) {
                assert!(
                    other.error_score(&pose) > 0.0,
                    "{} matches {} perfectly",
                    other.id,
                    target.id
                );
            }
        }
    }

    #[test]
    fn test_unknown_position() {
        let catalog = Catalog::running_man();
        assert!(catalog.position("moonwalk").is_none());
        assert!(matches!(
            catalog.require("moonwalk"),
            Err(Error::UnknownPosition(_))
        ));
    }

    #[test]
    fn test_step_patterns_are_validated() {
        let catalog = Catalog::running_man();
        let bad = vec![StepPattern::new("kick", ["right-kick"])];
        assert!(catalog.clone().with_step_patterns(bad).is_err());

        let json = r#"[{"name": "hold", "positions": ["right-up", "right-up"]}]"#;
        let catalog = catalog.with_step_patterns_json(json).unwrap();
        assert_eq!(catalog.step_patterns()[0].name, "hold");
        assert!(catalog.step_pattern("running man right").is_none());
    }
}
