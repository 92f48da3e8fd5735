//! Pose math for SDF models.
//!
//! Rotations follow the SDF convention `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
//! Everything here is pure and allocation free.

// Re-export the f64 glam types the rest of the workspace uses
pub use glam::{DMat3, DVec3};

mod convention;
mod pose;
mod rotation;

pub use convention::{
    convert_point_to_target, convert_rotation_to_target, TargetRotation, TargetTransform,
    METERS_TO_TARGET_UNITS,
};
pub use pose::{compose, Pose};
pub use rotation::{rpy_to_matrix, DMat3Ext, GIMBAL_EPSILON};
