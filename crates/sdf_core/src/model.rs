//! Normalized model types for SDF documents.
//!
//! These are plain values: every optional field has its documented default
//! in a `Default` impl, and nothing here validates. The parser fills them in
//! once and they are read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};

use sdf_math::{DVec3, Pose};
use serde::Serialize;

use crate::mesh::mesh_display_name;

/// A mesh reference from a `<geometry><mesh>` element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mesh {
    /// Display name derived from the URI; also the lookup key for resolved content
    pub name: String,

    /// Source URI as written in the document
    pub uri: String,

    /// Per-axis scale
    pub scale: DVec3,
}

impl Mesh {
    /// Create a mesh reference, deriving its display name from `uri`.
    pub fn from_uri(uri: impl Into<String>, scale: DVec3) -> Self {
        let uri = uri.into();
        Self {
            name: mesh_display_name(&uri),
            uri,
            scale,
        }
    }
}

/// Exactly one shape. A visual or collision without one holds `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Mesh(Mesh),
    Box { size: DVec3 },
    Cylinder { radius: f64, length: f64 },
    Sphere { radius: f64 },
}

impl Geometry {
    pub const DEFAULT_BOX_SIZE: DVec3 = DVec3::ONE;
    pub const DEFAULT_CYLINDER_RADIUS: f64 = 0.5;
    pub const DEFAULT_CYLINDER_LENGTH: f64 = 1.0;
    pub const DEFAULT_SPHERE_RADIUS: f64 = 0.5;

    pub fn mesh(&self) -> Option<&Mesh> {
        match self {
            Geometry::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Scale to apply to a unit-sized stand-in shape (1 m cube, 1 m
    /// diameter sphere, 1 m diameter x 1 m cylinder). Meshes keep their own scale.
    pub fn target_scale(&self) -> DVec3 {
        match self {
            Geometry::Mesh(mesh) => mesh.scale,
            Geometry::Box { size } => *size,
            Geometry::Sphere { radius } => DVec3::splat(radius * 2.0),
            Geometry::Cylinder { radius, length } => {
                DVec3::new(radius * 2.0, radius * 2.0, *length)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Visual {
    pub pose: Pose,
    pub geometry: Option<Geometry>,

    /// 0 = opaque, 1 = fully transparent
    pub transparency: f64,
    pub cast_shadows: bool,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            geometry: None,
            transparency: 0.0,
            cast_shadows: true,
        }
    }
}

/// ODE friction coefficients and slip.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OdeFriction {
    pub mu: f64,
    pub mu2: f64,
    pub slip1: f64,
    pub slip2: f64,
}

impl Default for OdeFriction {
    fn default() -> Self {
        Self {
            mu: 1.0,
            mu2: 1.0,
            slip1: 0.0,
            slip2: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TorsionalFriction {
    pub coefficient: f64,
    pub patch_radius: f64,
    pub surface_radius: f64,
    pub use_patch_radius: bool,
    pub ode_slip: f64,
}

impl Default for TorsionalFriction {
    fn default() -> Self {
        Self {
            coefficient: 1.0,
            patch_radius: 0.0,
            surface_radius: 0.0,
            use_patch_radius: true,
            ode_slip: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Friction {
    pub ode: OdeFriction,
    pub torsional: TorsionalFriction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bounce {
    pub restitution_coefficient: f64,
    pub threshold: f64,
}

impl Default for Bounce {
    fn default() -> Self {
        Self {
            restitution_coefficient: 0.0,
            threshold: 1e6,
        }
    }
}

/// ODE contact softness parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OdeContact {
    pub soft_cfm: f64,
    pub soft_erp: f64,
    pub kp: f64,
    pub kd: f64,
    pub max_vel: f64,
    pub min_depth: f64,
}

impl Default for OdeContact {
    fn default() -> Self {
        Self {
            soft_cfm: 0.0,
            soft_erp: 0.2,
            kp: 1e12,
            kd: 1.0,
            max_vel: 0.01,
            min_depth: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulletContact {
    pub split_impulse: bool,
    pub split_impulse_penetration_threshold: f64,
    pub soft_cfm: f64,
    pub soft_erp: f64,
    pub kp: f64,
    pub kd: f64,
}

impl Default for BulletContact {
    fn default() -> Self {
        Self {
            split_impulse: true,
            split_impulse_penetration_threshold: -0.01,
            soft_cfm: 0.0,
            soft_erp: 0.2,
            kp: 1e13,
            kd: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contact {
    pub collide_without_contact: bool,
    pub collide_without_contact_bitmask: u32,
    pub collide_bitmask: u32,
    pub ode: OdeContact,
    pub bullet: BulletContact,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            collide_without_contact: false,
            collide_without_contact_bitmask: 1,
            collide_bitmask: 1,
            ode: OdeContact::default(),
            bullet: BulletContact::default(),
        }
    }
}

/// Contact material of a collision. Stored as parsed, never interpreted here.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Surface {
    pub friction: Friction,
    pub bounce: Bounce,
    pub contact: Contact,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Collision {
    pub name: String,
    pub pose: Pose,
    pub geometry: Option<Geometry>,
    pub surface: Surface,
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            name: "UnnamedCollision".to_string(),
            pose: Pose::IDENTITY,
            geometry: None,
            surface: Surface::default(),
        }
    }
}

/// Symmetric inertia tensor, upper triangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Inertia {
    pub ixx: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyy: f64,
    pub iyz: f64,
    pub izz: f64,
}

impl Default for Inertia {
    fn default() -> Self {
        Self {
            ixx: 1.0,
            ixy: 0.0,
            ixz: 0.0,
            iyy: 1.0,
            iyz: 0.0,
            izz: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Inertial {
    /// Mass in kilograms
    pub mass: f64,

    /// Center of mass offset
    pub pose: Pose,
    pub inertia: Inertia,
}

impl Default for Inertial {
    fn default() -> Self {
        Self {
            mass: 1.0,
            pose: Pose::IDENTITY,
            inertia: Inertia::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Link {
    pub name: String,
    pub pose: Pose,
    pub visuals: Vec<Visual>,
    pub collisions: Vec<Collision>,
    pub inertial: Inertial,
}

impl Link {
    pub const DEFAULT_NAME: &'static str = "UnnamedLink";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pose: Pose::IDENTITY,
            visuals: Vec::new(),
            collisions: Vec::new(),
            inertial: Inertial::default(),
        }
    }

    /// Mesh references of this link's visuals, in document order.
    pub fn visual_meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.visuals
            .iter()
            .filter_map(|v| v.geometry.as_ref().and_then(Geometry::mesh))
    }
}

/// Joint limits. `effort` and `velocity` are `None` when not written, which
/// is not the same as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Limit {
    pub lower: f64,
    pub upper: f64,
    pub effort: Option<f64>,
    pub velocity: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dynamics {
    pub damping: f64,
    pub friction: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Joint {
    pub name: String,

    /// Parent link name. Not checked against the model.
    pub parent: String,

    /// Child link name. Not checked against the model.
    pub child: String,

    /// Joint type as written (`revolute`, `prismatic`, ...)
    pub kind: String,

    /// Placement relative to the child link
    pub pose: Pose,
    pub axis: DVec3,
    pub limit: Limit,
    pub dynamics: Dynamics,
}

impl Joint {
    pub const DEFAULT_NAME: &'static str = "UnnamedJoint";
    pub const DEFAULT_KIND: &'static str = "fixed";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: String::new(),
            child: String::new(),
            kind: Self::DEFAULT_KIND.to_string(),
            pose: Pose::IDENTITY,
            axis: DVec3::ZERO,
            limit: Limit::default(),
            dynamics: Dynamics::default(),
        }
    }
}

/// Which mapping a name collision happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Link,
    Joint,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Link => f.write_str("link"),
            EntityKind::Joint => f.write_str("joint"),
        }
    }
}

/// A later definition that replaced an earlier one with the same name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub kind: EntityKind,
    pub name: String,
}

/// A parsed model: links and joints keyed by name.
///
/// Maps are ordered by name so every derived output is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub links: BTreeMap<String, Link>,
    pub joints: BTreeMap<String, Joint>,

    /// Names that were defined more than once; the last definition won
    pub collisions: Vec<NameCollision>,
}

impl Model {
    pub const DEFAULT_NAME: &'static str = "UnnamedModel";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Insert a link, replacing (and recording) any link with the same name.
    pub fn insert_link(&mut self, link: Link) {
        if let Some(previous) = self.links.insert(link.name.clone(), link) {
            log::warn!("Link '{}' defined more than once; keeping the last one", previous.name);
            self.collisions.push(NameCollision {
                kind: EntityKind::Link,
                name: previous.name,
            });
        }
    }

    /// Insert a joint, replacing (and recording) any joint with the same name.
    pub fn insert_joint(&mut self, joint: Joint) {
        if let Some(previous) = self.joints.insert(joint.name.clone(), joint) {
            log::warn!("Joint '{}' defined more than once; keeping the last one", previous.name);
            self.collisions.push(NameCollision {
                kind: EntityKind::Joint,
                name: previous.name,
            });
        }
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.get(name)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Sum of all link masses.
    pub fn total_mass(&self) -> f64 {
        self.links.values().map(|l| l.inertial.mass).sum()
    }

    /// Distinct mesh names referenced by any visual, sorted.
    pub fn visual_mesh_names(&self) -> BTreeSet<&str> {
        self.links
            .values()
            .flat_map(Link::visual_meshes)
            .map(|m| m.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_with_mesh(name: &str, uri: &str) -> Link {
        let mut link = Link::new(name);
        link.visuals.push(Visual {
            geometry: Some(Geometry::Mesh(Mesh::from_uri(uri, DVec3::ONE))),
            ..Default::default()
        });
        link
    }

    #[test]
    fn test_defaults() {
        let link = Link::new("base");
        assert_eq!(link.inertial.mass, 1.0);
        assert_eq!(link.inertial.inertia.ixx, 1.0);
        assert_eq!(link.inertial.inertia.ixy, 0.0);

        let joint = Joint::new("j");
        assert_eq!(joint.kind, "fixed");
        assert_eq!(joint.axis, DVec3::ZERO);
        assert!(joint.limit.effort.is_none());
        assert!(joint.limit.velocity.is_none());

        let visual = Visual::default();
        assert!(visual.cast_shadows);
        assert_eq!(visual.transparency, 0.0);
    }

    #[test]
    fn test_insert_link_records_collision() {
        let mut model = Model::new("m");
        model.insert_link(Link::new(Link::DEFAULT_NAME));
        let mut second = Link::new(Link::DEFAULT_NAME);
        second.inertial.mass = 4.0;
        model.insert_link(second);

        assert_eq!(model.link_count(), 1);
        assert_eq!(model.links[Link::DEFAULT_NAME].inertial.mass, 4.0);
        assert_eq!(
            model.collisions,
            vec![NameCollision {
                kind: EntityKind::Link,
                name: Link::DEFAULT_NAME.to_string()
            }]
        );
    }

    #[test]
    fn test_visual_mesh_names_are_distinct_and_sorted() {
        let mut model = Model::new("m");
        model.insert_link(link_with_mesh("b", "meshes/stem.dae"));
        model.insert_link(link_with_mesh("a", "meshes/leaf.stl"));
        model.insert_link(link_with_mesh("c", "meshes/stem.dae"));

        let names: Vec<_> = model.visual_mesh_names().into_iter().collect();
        assert_eq!(names, vec!["leaf", "stem"]);
    }

    #[test]
    fn test_target_scale() {
        let sphere = Geometry::Sphere { radius: 0.25 };
        assert_eq!(sphere.target_scale(), DVec3::splat(0.5));

        let cylinder = Geometry::Cylinder {
            radius: 0.1,
            length: 2.0,
        };
        assert_eq!(cylinder.target_scale(), DVec3::new(0.2, 0.2, 2.0));

        let boxed = Geometry::Box {
            size: DVec3::new(1.0, 2.0, 3.0),
        };
        assert_eq!(boxed.target_scale(), DVec3::new(1.0, 2.0, 3.0));
    }
}
