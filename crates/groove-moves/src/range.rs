//! Tolerance band for a single joint angle.

use serde::{Deserialize, Serialize};

/// Defines in what range a joint angle should be
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub weight: f64,
}

impl Range {
    /// # Panics
    ///
    /// If `min > max` or the weight is negative.
    pub fn new(min: f64, max: f64, weight: f64) -> Self {
        assert!(min <= max, "range min {min} > max {max}");
        assert!(weight >= 0.0, "negative range weight {weight}");
        Self { min, max, weight }
    }

    pub fn with_tolerance(perfect: f64, tolerance: f64, weight: f64) -> Self {
        Self::new(perfect - tolerance, perfect + tolerance, weight)
    }

    pub fn contains(&self, actual: f64) -> bool {
        self.min <= actual && actual <= self.max
    }

    /// Zero inside the band, weighted squared distance to the nearest bound outside.
    pub fn error_score(&self, actual: f64) -> f64 {
        if self.contains(actual) {
            return 0.0;
        }
        self.weight * (self.min - actual).powi(2).min((self.max - actual).powi(2))
    }

    /// Signed offset from `actual` to the nearest bound
    pub fn diff(&self, actual: f64) -> f64 {
        let smaller = self.min - actual;
        let greater = self.max - actual;
        if smaller.abs() < greater.abs() {
            smaller
        } else {
            greater
        }
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}
