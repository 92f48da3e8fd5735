//! Rotation helpers for roll/pitch/yaw poses.
//!
//! Extends glam::DMat3 with row/column access and Euler decomposition.
//! Note: glam matrices are column-major, so `element(row, col)` reads `col(col)[row]`.

use glam::{DMat3, DVec3};

/// Threshold on `sqrt(R00^2 + R10^2)` below which the decomposition treats
/// the rotation as gimbal locked (pitch at +/-90 degrees).
pub const GIMBAL_EPSILON: f64 = 1e-6;

/// Build the rotation matrix `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rpy_to_matrix(roll: f64, pitch: f64, yaw: f64) -> DMat3 {
    DMat3::from_rotation_z(yaw) * DMat3::from_rotation_y(pitch) * DMat3::from_rotation_x(roll)
}

/// Extension trait for DMat3 to read rotations back as roll/pitch/yaw.
pub trait DMat3Ext {
    /// Matrix element in row-major terms (`R[row][col]`).
    fn element(&self, row: usize, col: usize) -> f64;

    /// Decompose a rotation matrix into `(roll, pitch, yaw)`.
    ///
    /// At the gimbal-lock singularity roll and yaw are degenerate; yaw is
    /// fixed to zero and the whole rotation about the vertical is folded
    /// into roll. Never panics, and returns finite angles for any finite input.
    fn to_rpy(&self) -> DVec3;
}

impl DMat3Ext for DMat3 {
    fn element(&self, row: usize, col: usize) -> f64 {
        self.col(col)[row]
    }

    fn to_rpy(&self) -> DVec3 {
        let r = |row, col| self.element(row, col);

        let s = (r(0, 0) * r(0, 0) + r(1, 0) * r(1, 0)).sqrt();
        let pitch = (-r(2, 0)).atan2(s);

        if s >= GIMBAL_EPSILON {
            let roll = r(2, 1).atan2(r(2, 2));
            let yaw = r(1, 0).atan2(r(0, 0));
            DVec3::new(roll, pitch, yaw)
        } else {
            let roll = (-r(1, 2)).atan2(r(1, 1));
            DVec3::new(roll, pitch, 0.0)
        }
    }
}
