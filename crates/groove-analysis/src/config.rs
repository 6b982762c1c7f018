//! Analysis tuning parameters.

use serde::{Deserialize, Serialize};

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrooveConfig {
    /// Time windows for position matching
    pub matching: MatchingConfig,

    /// Star rating thresholds
    pub scoring: ScoringConfig,

    /// Tempo settings
    pub rhythm: RhythmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Smallest time between two consecutive matches (ms)
    pub min_dt: i64,

    /// Largest time between two consecutive matches (ms)
    pub max_dt: i64,

    /// Same-position detections closer than this are merged (ms)
    pub min_dt_repeat: i64,

    /// Freestyle detections with a larger error are not reported
    pub error_threshold: f64,

    /// Steps ending this close to the end of a live history are provisional (ms)
    pub lookahead_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Errors below this count as perfect
    pub perfect: f64,

    /// Errors below this count as acceptable
    pub good: f64,

    /// Steps with a mean error above this get the "bad step" feedback
    pub bad_step_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Tempo of the music the dancer follows
    pub bpm: f64,

    /// Tempos tried by the estimators
    pub candidate_bpms: Vec<f64>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_dt: 190,
            max_dt: 1350,
            min_dt_repeat: 500,
            error_threshold: 5.0,
            lookahead_ms: 200,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            perfect: 0.5,
            good: 1.0,
            bad_step_threshold: 1.0,
        }
    }
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            bpm: 100.0,
            candidate_bpms: (40..=70).map(|half| half as f64 * 2.0).collect(),
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> groove_core::Result<()> {
        if self.min_dt < 0 || self.min_dt > self.max_dt {
            return Err(groove_core::Error::Config(format!(
                "matching window [{}, {}] is invalid",
                self.min_dt, self.max_dt
            )));
        }
        Ok(())
    }
}

impl GrooveConfig {
    /// Load configuration from file, environment variables take precedence
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GROOVE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GROOVE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
