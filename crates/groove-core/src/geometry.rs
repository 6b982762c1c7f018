//! Joint-angle geometry.
//!
//! All angles are in degrees. The image coordinate system has y pointing
//! down, so a segment hanging straight down has a polar angle of zero.

use nalgebra::{Point2, Vector3};

use crate::types::Position3D;

fn segment(start: &Position3D, end: &Position3D) -> Vector3<f64> {
    end.to_nalgebra() - start.to_nalgebra()
}

/// Angle between the segment `start -> end` and the downward vertical.
///
/// Always in `[0, 180]`, zero when `end` lies straight below `start`.
pub fn polar_angle(start: &Position3D, end: &Position3D) -> f64 {
    let v = segment(start, end);
    let horizontal = v.x.hypot(v.z);
    horizontal.atan2(v.y).to_degrees()
}

/// Polar angle, negative when the segment leans towards the left of the image.
pub fn signed_polar_angle(start: &Position3D, end: &Position3D) -> f64 {
    let polar = polar_angle(start, end);
    if segment(start, end).x < 0.0 {
        -polar
    } else {
        polar
    }
}

/// Heading of the segment `start -> end` seen from above, in `(-180, 180]`.
///
/// Zero points away from the camera, 90 points to the right of the image.
pub fn azimuth(start: &Position3D, end: &Position3D) -> f64 {
    let v = segment(start, end);
    v.x.atan2(v.z).to_degrees()
}

/// Walk `length` from `origin` in the image plane at a signed polar angle.
pub fn add_2d_vector(origin: Point2<f64>, angle: f64, length: f64) -> Point2<f64> {
    let (sin, cos) = angle.to_radians().sin_cos();
    Point2::new(origin.x + length * sin, origin.y + length * cos)
}
