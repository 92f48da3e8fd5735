//! Six-scalar poses and rigid-transform composition.

use glam::{DMat3, DVec3};
use serde::Serialize;

use crate::convention::{convert_point_to_target, convert_rotation_to_target, TargetTransform};
use crate::rotation::{rpy_to_matrix, DMat3Ext};

/// A 6-DOF placement: translation in meters, roll/pitch/yaw in radians.
///
/// Always fully populated; short pose text is zero-padded by the parser
/// before it ever becomes a `Pose`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// Build a pose from up to six values, zero-padding the missing ones.
    /// Extra values are ignored.
    pub fn from_values(values: &[f64]) -> Self {
        let mut v = [0.0; 6];
        for (slot, value) in v.iter_mut().zip(values) {
            *slot = *value;
        }
        Self::new(v[0], v[1], v[2], v[3], v[4], v[5])
    }

    /// Build a pose from a translation and a `(roll, pitch, yaw)` vector.
    pub fn from_parts(translation: DVec3, rpy: DVec3) -> Self {
        Self::new(translation.x, translation.y, translation.z, rpy.x, rpy.y, rpy.z)
    }

    pub fn translation(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// `(roll, pitch, yaw)` as a vector.
    pub fn rpy(&self) -> DVec3 {
        DVec3::new(self.roll, self.pitch, self.yaw)
    }

    pub fn rotation_matrix(&self) -> DMat3 {
        rpy_to_matrix(self.roll, self.pitch, self.yaw)
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.roll, self.pitch, self.yaw]
    }

    /// Apply `child` in this pose's frame. See [`compose`].
    pub fn compose(&self, child: &Pose) -> Pose {
        compose(self, child)
    }

    /// Location and rotation in the target environment's convention.
    pub fn to_target(&self) -> TargetTransform {
        TargetTransform {
            location: convert_point_to_target(self.x, self.y, self.z),
            rotation: convert_rotation_to_target(self.roll, self.pitch, self.yaw),
        }
    }
}

/// Compose two rigid transforms: `child` expressed in `parent`'s frame.
///
/// `R = R_parent * R_child`, `t = t_parent + R_parent * t_child`, and the
/// rotation is decomposed back to roll/pitch/yaw with gimbal-lock handling.
pub fn compose(parent: &Pose, child: &Pose) -> Pose {
    let parent_rotation = parent.rotation_matrix();
    let rotation = parent_rotation * child.rotation_matrix();
    let translation = parent.translation() + parent_rotation * child.translation();

    Pose::from_parts(translation, rotation.to_rpy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

    /// Difference between two angles folded into [-PI, PI].
    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        if d > PI {
            d - TAU
        } else {
            d
        }
    }

    fn assert_pose_close(a: &Pose, b: &Pose, eps: f64) {
        assert!(
            (a.translation() - b.translation()).length() < eps,
            "translation mismatch: {a:?} vs {b:?}"
        );
        for (x, y) in [(a.roll, b.roll), (a.pitch, b.pitch), (a.yaw, b.yaw)] {
            assert!(angle_diff(x, y).abs() < eps, "rotation mismatch: {a:?} vs {b:?}");
        }
    }

    fn random_pose(rng: &mut StdRng) -> Pose {
        Pose::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-1.2..1.2),
            rng.gen_range(-3.0..3.0),
        )
    }

    #[test]
    fn test_from_values_pads_with_zero() {
        assert_eq!(Pose::from_values(&[1.0, 2.0]), Pose::new(1.0, 2.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(Pose::from_values(&[]), Pose::IDENTITY);
    }

    #[test]
    fn test_from_values_ignores_extra() {
        let pose = Pose::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(pose.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_compose_identity_left() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let pose = random_pose(&mut rng);
            assert_pose_close(&compose(&Pose::IDENTITY, &pose), &pose, 1e-12);
        }
    }

    #[test]
    fn test_compose_identity_right() {
        let pose = Pose::new(1.0, -2.0, 0.5, 0.2, -0.3, 1.1);
        assert_pose_close(&compose(&pose, &Pose::IDENTITY), &pose, 1e-12);
    }

    #[test]
    fn test_compose_translation_is_rotated() {
        let parent = Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2);
        let child = Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let result = compose(&parent, &child);

        assert!((result.translation() - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-12);
        assert!((result.yaw - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_compose_is_associative() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut checked = 0;

        for _ in 0..500 {
            let a = random_pose(&mut rng);
            let b = random_pose(&mut rng);
            let c = random_pose(&mut rng);

            let ab = compose(&a, &b);
            let bc = compose(&b, &c);
            let left = compose(&ab, &c);
            let right = compose(&a, &bc);

            // Euler angles are ill-conditioned next to the singularity
            if [ab.pitch, bc.pitch, left.pitch].iter().any(|p| p.cos() < 0.1) {
                continue;
            }

            assert_pose_close(&left, &right, 1e-9);
            checked += 1;
        }

        assert!(checked > 100);
    }

    #[test]
    fn test_compose_pitch_exactly_ninety_degrees() {
        let half = Pose::new(0.0, 0.0, 0.0, 0.0, FRAC_PI_4, 0.0);
        let result = compose(&half, &Pose::new(1.0, 0.0, 0.0, 0.4, FRAC_PI_4, 0.0));

        assert!(result.to_array().iter().all(|v| v.is_finite()));
        assert_eq!(result.yaw, 0.0);
        assert!((result.pitch - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_compose_pitch_minus_ninety_degrees() {
        let down = Pose::new(0.0, 0.0, 0.0, 0.0, -FRAC_PI_2, 0.7);
        let result = compose(&down, &Pose::IDENTITY);

        assert!(result.to_array().iter().all(|v| v.is_finite()));
        assert_eq!(result.yaw, 0.0);
        assert!((result.pitch + FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_to_target() {
        let pose = Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2);
        let target = pose.to_target();

        assert_eq!(target.location, DVec3::new(100.0, -200.0, 300.0));
        assert!((target.rotation.yaw + 90.0).abs() < 1e-9);
    }
}
