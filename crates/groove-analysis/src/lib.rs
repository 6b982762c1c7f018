//! # Groove-Analysis
//!
//! Compares a recorded pose history against the reference material of
//! `groove-moves`.
//!
//! ## Pipeline
//!
//! 1. **Best fit**: the sample in a time window closest to a target position
//! 2. **Matching**: anchored to a known [`Move`](groove_moves::Move) beat by
//!    beat, or free-form detection of any catalog position
//! 3. **Steps**: greedy grouping of detected positions into step patterns
//! 4. **Scoring**: stars per step and a session rating
//! 5. **Rhythm**: tempo and phase estimates, by pose shape or by foot stillness
//!
//! Everything here is a synchronous, pure function of an immutable history
//! slice. The [`Tracker`] owns a live history and hands out snapshots.

pub mod anchored;
pub mod config;
pub mod detection;
pub mod fit;
pub mod pipeline;
pub mod rhythm;
pub mod scoring;
pub mod steps;
pub mod tracker;

pub use anchored::*;
pub use self::config::*;
pub use detection::*;
pub use fit::*;
pub use pipeline::*;
pub use rhythm::*;
pub use scoring::*;
pub use steps::*;
pub use tracker::*;
