//! # Groove-Core
//!
//! Core types for the dance move trainer: BlazePose keypoints, joint-angle
//! geometry, and the direction-normalized body pose derived from them.
//!
//! A tracked instant is a [`Sample`]. Its [`BodyPose`] holds six leg angles in
//! degrees which are all zero when standing straight. Thigh and full-leg
//! angles grow positive when the leg swings forward, shins grow positive when
//! the knee bends. The facing direction of the dancer is folded into the sign
//! so one move definition matches a dancer facing either side.

pub mod error;
pub mod geometry;
pub mod pose;
pub mod sample;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use pose::*;
pub use sample::*;
pub use types::*;
