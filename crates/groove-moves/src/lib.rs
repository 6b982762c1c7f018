//! # Groove-Moves
//!
//! Reference material the analysis matches against.
//!
//! - [`Range`]: tolerance band with a penalty weight for one joint angle
//! - [`NamedPosition`]: six ranges describing how a position *should* look
//! - [`Catalog`]: the fixed set of named positions, step patterns and
//!   choreographies, built once per session and passed by reference
//! - [`Move`]: a cyclic sequence of positions, one per beat
//!
//! Error scores of a position are weighted squared distances in degrees².
//! Everything downstream reports them divided by [`ERROR_SCALE`].

pub mod catalog;
pub mod moves;
pub mod position;
pub mod range;
pub mod steps;

pub use catalog::*;
pub use moves::*;
pub use position::*;
pub use range::*;
pub use steps::*;

/// Divisor applied to raw position error scores before they are reported
pub const ERROR_SCALE: f64 = 1000.0;
