//! Placement of links and joints for the scene builder.
//!
//! Joint placement is relative to the joint's own child link only. The
//! chain of ancestors above that link is not accumulated.

use sdf_math::{compose, Pose};

use crate::model::{Joint, Link, Model};

/// Pose of a joint: the child link's pose composed with the joint's pose.
///
/// Returns the identity when the child link is not in the model.
pub fn world_pose_of_joint_child(model: &Model, joint: &Joint) -> Pose {
    match model.link(&joint.child) {
        Some(child_link) => compose(&child_link.pose, &joint.pose),
        None => {
            log::debug!(
                "Joint '{}' references unknown child link '{}'",
                joint.name,
                joint.child
            );
            Pose::IDENTITY
        }
    }
}

/// Pose of a link's main body: its first visual placed in the link frame,
/// or the link pose itself when it has no visuals.
pub fn link_placement(link: &Link) -> Pose {
    match link.visuals.first() {
        Some(visual) => compose(&link.pose, &visual.pose),
        None => link.pose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visual;
    use sdf_math::DVec3;
    use std::f64::consts::FRAC_PI_2;

    fn model_with_link(name: &str, pose: Pose) -> Model {
        let mut model = Model::new("m");
        let mut link = Link::new(name);
        link.pose = pose;
        model.insert_link(link);
        model
    }

    #[test]
    fn test_joint_pose_composes_with_child() {
        let model = model_with_link("leaf", Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2));
        let mut joint = Joint::new("j");
        joint.child = "leaf".to_string();
        joint.pose = Pose::new(0.5, 0.0, 0.0, 0.0, 0.0, 0.0);

        let pose = world_pose_of_joint_child(&model, &joint);
        assert!((pose.translation() - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-12);
        assert!((pose.yaw - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_joint_with_missing_child_is_identity() {
        let model = model_with_link("leaf", Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0));
        let mut joint = Joint::new("j");
        joint.child = "ghost".to_string();
        joint.pose = Pose::new(5.0, 5.0, 5.0, 0.0, 0.0, 0.0);

        assert_eq!(world_pose_of_joint_child(&model, &joint), Pose::IDENTITY);
    }

    #[test]
    fn test_joint_ignores_parent_chain() {
        let mut model = model_with_link("leaf", Pose::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0));
        let mut stem = Link::new("stem");
        stem.pose = Pose::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        model.insert_link(stem);

        let mut joint = Joint::new("j");
        joint.parent = "stem".to_string();
        joint.child = "leaf".to_string();

        let pose = world_pose_of_joint_child(&model, &joint);
        assert_eq!(pose.x, 0.0);
        assert_eq!(pose.z, 1.0);
    }

    #[test]
    fn test_link_placement_uses_first_visual() {
        let mut link = Link::new("l");
        link.pose = Pose::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(link_placement(&link), link.pose);

        link.visuals.push(Visual {
            pose: Pose::new(0.0, 0.0, 2.0, 0.0, 0.0, 0.0),
            ..Default::default()
        });
        link.visuals.push(Visual {
            pose: Pose::new(0.0, 0.0, 9.0, 0.0, 0.0, 0.0),
            ..Default::default()
        });

        let placed = link_placement(&link);
        assert_eq!(placed.translation(), DVec3::new(1.0, 0.0, 2.0));
    }
}
