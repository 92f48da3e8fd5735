//! Conversion from the SDF frame to the target environment's frame.
//!
//! SDF is right-handed, Z-up, meters and radians. The target is left-handed
//! (Y flipped), centimeters, and takes rotations as (pitch, yaw, roll) in degrees.

use glam::DVec3;
use serde::Serialize;

/// Meters to target units (centimeters).
pub const METERS_TO_TARGET_UNITS: f64 = 100.0;

/// A rotation in the target's axis order, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TargetRotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Location and rotation ready to hand to the scene builder.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetTransform {
    pub location: DVec3,
    pub rotation: TargetRotation,
}

/// Remap an SDF roll/pitch/yaw (radians) to the target convention.
///
/// Pitch and yaw flip sign with the handedness change, roll is kept, and the
/// result is in degrees. This is the only place radians become degrees.
pub fn convert_rotation_to_target(roll: f64, pitch: f64, yaw: f64) -> TargetRotation {
    TargetRotation {
        pitch: -pitch.to_degrees(),
        yaw: -yaw.to_degrees(),
        roll: roll.to_degrees(),
    }
}

/// Scale a point from meters to target units and flip Y.
pub fn convert_point_to_target(x: f64, y: f64, z: f64) -> DVec3 {
    DVec3::new(x, -y, z) * METERS_TO_TARGET_UNITS
}
