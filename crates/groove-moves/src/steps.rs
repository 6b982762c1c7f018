//! Step patterns and choreographies.

use groove_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// A named, ordered sequence of position ids that forms one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPattern {
    pub name: String,
    pub positions: Vec<String>,
}

impl StepPattern {
    pub fn new<S: Into<String>>(name: impl Into<String>, positions: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            positions: positions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Parse a JSON array of `{ "name": ..., "positions": [...] }`.
    ///
    /// Order is kept, it decides which pattern wins when several match.
    pub fn list_from_json(json: &str) -> Result<Vec<StepPattern>> {
        let patterns: Vec<StepPattern> = serde_json::from_str(json)?;
        if let Some(empty) = patterns.iter().find(|p| p.is_empty()) {
            return Err(Error::InvalidInput(format!(
                "step pattern {} has no positions",
                empty.name
            )));
        }
        Ok(patterns)
    }
}

/// The running man steps, in matching priority
pub fn default_step_patterns() -> Vec<StepPattern> {
    vec![
        StepPattern::new("running man right", ["right-forward", "left-up"]),
        StepPattern::new("running man left", ["left-forward", "right-up"]),
        StepPattern::new("reverse running man right", ["right-forward", "right-up"]),
        StepPattern::new("reverse running man left", ["left-forward", "left-up"]),
    ]
}

/// A routine made of named steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choreography {
    pub name: String,
    pub steps: Vec<String>,
    /// Beat indices at which the dancer turns around
    #[serde(default)]
    pub turns: Vec<usize>,
}

impl Choreography {
    pub fn new<S: Into<String>>(name: impl Into<String>, steps: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(Into::into).collect(),
            turns: Vec::new(),
        }
    }

    pub fn with_turns(mut self, turns: impl IntoIterator<Item = usize>) -> Self {
        self.turns = turns.into_iter().collect();
        self
    }

    pub fn is_turn(&self, beat: usize) -> bool {
        self.turns.contains(&beat)
    }

    /// Expand the steps into the position ids expected beat by beat.
    pub fn positions(&self, catalog: &Catalog) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for step in &self.steps {
            let pattern = catalog
                .step_pattern(step)
                .ok_or_else(|| Error::UnknownStep(step.clone()))?;
            out.extend(pattern.positions.iter().cloned());
        }
        Ok(out)
    }
}

pub fn default_choreographies() -> Vec<Choreography> {
    vec![
        Choreography::new("Running One", ["running man right", "running man left"]),
        Choreography::new(
            "Turn and Run",
            [
                "running man right",
                "running man left",
                "running man right",
                "running man right",
            ],
        )
        .with_turns([6]),
    ]
}
