//! SDF document parser.
//!
//! Builds a [`Model`] from the first `<model>` element of an SDF document.
//!
//! # Supported Elements
//!
//! - `model[name]` with `link` and `joint` children
//! - `link > pose, inertial, visual*, collision*`
//! - `visual > pose, transparency, cast_shadows, geometry`
//! - `collision[name] > pose, geometry, surface`
//! - `geometry > mesh{uri, scale} | box{size} | cylinder{radius, length} | sphere{radius}`
//! - `joint[name, type] > parent, child, pose, axis{xyz, limit, dynamics}`
//!
//! Every missing leaf takes its documented default. Text that should be a
//! number but is not fails the whole parse.

use sdf_math::{DVec3, Pose};
use thiserror::Error;

use super::xml::{parse_document, Element};
use crate::model::{
    Bounce, BulletContact, Collision, Contact, Dynamics, Friction, Geometry, Inertia, Inertial,
    Joint, Limit, Link, Mesh, Model, OdeContact, OdeFriction, Surface, TorsionalFriction, Visual,
};

/// Errors that can occur while parsing SDF text.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("No <model> element found")]
    NoModel,

    #[error("Invalid number in <{element}>: {text:?}")]
    InvalidNumber { element: String, text: String },

    #[error("Invalid boolean in <{element}>: {text:?}")]
    InvalidBool { element: String, text: String },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse SDF text into a model.
pub fn parse_sdf_str(content: &str) -> ParseResult<Model> {
    let root = parse_document(content)?;
    let model_elem = root.find("model").ok_or(ParseError::NoModel)?;
    parse_model(model_elem)
}

/// Parse pose text (`x y z roll pitch yaw`), zero-padding short input.
///
/// Blank text is the identity pose.
pub fn parse_pose(text: &str) -> ParseResult<Pose> {
    let values = parse_floats(text, "pose")?;
    Ok(Pose::from_values(&values))
}

fn parse_model(elem: &Element) -> ParseResult<Model> {
    let mut model = Model::new(elem.attr("name").unwrap_or(Model::DEFAULT_NAME));

    for link_elem in elem.children_named("link") {
        model.insert_link(parse_link(link_elem)?);
    }

    for joint_elem in elem.children_named("joint") {
        model.insert_joint(parse_joint(joint_elem)?);
    }

    log::debug!(
        "Parsed model '{}': {} links, {} joints",
        model.name,
        model.link_count(),
        model.joint_count()
    );

    Ok(model)
}

fn parse_link(elem: &Element) -> ParseResult<Link> {
    let mut link = Link::new(elem.attr("name").unwrap_or(Link::DEFAULT_NAME));
    link.pose = pose_of(elem)?;

    for visual_elem in elem.children_named("visual") {
        link.visuals.push(parse_visual(visual_elem)?);
    }

    for collision_elem in elem.children_named("collision") {
        link.collisions.push(parse_collision(collision_elem)?);
    }

    if let Some(inertial_elem) = elem.child("inertial") {
        link.inertial = parse_inertial(inertial_elem)?;
    }

    Ok(link)
}

fn parse_visual(elem: &Element) -> ParseResult<Visual> {
    let defaults = Visual::default();
    Ok(Visual {
        pose: pose_of(elem)?,
        geometry: geometry_of(elem)?,
        transparency: float_or(elem, "transparency", defaults.transparency)?,
        cast_shadows: bool_or(elem, "cast_shadows", defaults.cast_shadows)?,
    })
}

fn parse_collision(elem: &Element) -> ParseResult<Collision> {
    let mut collision = Collision::default();
    if let Some(name) = elem.attr("name") {
        collision.name = name.to_string();
    }
    collision.pose = pose_of(elem)?;
    collision.geometry = geometry_of(elem)?;
    if let Some(surface_elem) = elem.child("surface") {
        collision.surface = parse_surface(surface_elem)?;
    }
    Ok(collision)
}

/// The `<geometry>` child of a visual or collision, if any.
///
/// The first recognized shape element decides the variant.
fn geometry_of(elem: &Element) -> ParseResult<Option<Geometry>> {
    let Some(geometry_elem) = elem.child("geometry") else {
        return Ok(None);
    };

    for shape in &geometry_elem.children {
        let geometry = match shape.name.as_str() {
            "mesh" => {
                let uri = shape.child_text("uri").unwrap_or("");
                let scale = vec3_or(shape, "scale", DVec3::ONE)?;
                Geometry::Mesh(Mesh::from_uri(uri, scale))
            }
            "box" => Geometry::Box {
                size: vec3_or(shape, "size", Geometry::DEFAULT_BOX_SIZE)?,
            },
            "cylinder" => Geometry::Cylinder {
                radius: float_or(shape, "radius", Geometry::DEFAULT_CYLINDER_RADIUS)?,
                length: float_or(shape, "length", Geometry::DEFAULT_CYLINDER_LENGTH)?,
            },
            "sphere" => Geometry::Sphere {
                radius: float_or(shape, "radius", Geometry::DEFAULT_SPHERE_RADIUS)?,
            },
            _ => continue,
        };
        return Ok(Some(geometry));
    }

    Ok(None)
}

fn parse_inertial(elem: &Element) -> ParseResult<Inertial> {
    let defaults = Inertial::default();
    let inertia = match elem.child("inertia") {
        Some(i) => {
            let d = Inertia::default();
            Inertia {
                ixx: float_or(i, "ixx", d.ixx)?,
                ixy: float_or(i, "ixy", d.ixy)?,
                ixz: float_or(i, "ixz", d.ixz)?,
                iyy: float_or(i, "iyy", d.iyy)?,
                iyz: float_or(i, "iyz", d.iyz)?,
                izz: float_or(i, "izz", d.izz)?,
            }
        }
        None => defaults.inertia,
    };

    Ok(Inertial {
        mass: float_or(elem, "mass", defaults.mass)?,
        pose: pose_of(elem)?,
        inertia,
    })
}

fn parse_surface(elem: &Element) -> ParseResult<Surface> {
    let mut surface = Surface::default();

    if let Some(friction_elem) = elem.child("friction") {
        surface.friction = parse_friction(friction_elem)?;
    }

    if let Some(bounce_elem) = elem.child("bounce") {
        let d = Bounce::default();
        surface.bounce = Bounce {
            restitution_coefficient: float_or(
                bounce_elem,
                "restitution_coefficient",
                d.restitution_coefficient,
            )?,
            threshold: float_or(bounce_elem, "threshold", d.threshold)?,
        };
    }

    if let Some(contact_elem) = elem.child("contact") {
        surface.contact = parse_contact(contact_elem)?;
    }

    Ok(surface)
}

fn parse_friction(elem: &Element) -> ParseResult<Friction> {
    let mut friction = Friction::default();

    if let Some(ode) = elem.child("ode") {
        let d = OdeFriction::default();
        friction.ode = OdeFriction {
            mu: float_or(ode, "mu", d.mu)?,
            mu2: float_or(ode, "mu2", d.mu2)?,
            slip1: float_or(ode, "slip1", d.slip1)?,
            slip2: float_or(ode, "slip2", d.slip2)?,
        };
    }

    if let Some(torsional) = elem.child("torsional") {
        let d = TorsionalFriction::default();
        let ode_slip = match torsional.child("ode") {
            Some(ode) => float_or(ode, "slip", d.ode_slip)?,
            None => d.ode_slip,
        };
        friction.torsional = TorsionalFriction {
            coefficient: float_or(torsional, "coefficient", d.coefficient)?,
            patch_radius: float_or(torsional, "patch_radius", d.patch_radius)?,
            surface_radius: float_or(torsional, "surface_radius", d.surface_radius)?,
            use_patch_radius: bool_or(torsional, "use_patch_radius", d.use_patch_radius)?,
            ode_slip,
        };
    }

    Ok(friction)
}

fn parse_contact(elem: &Element) -> ParseResult<Contact> {
    let d = Contact::default();

    let ode = match elem.child("ode") {
        Some(ode) => {
            let o = OdeContact::default();
            OdeContact {
                soft_cfm: float_or(ode, "soft_cfm", o.soft_cfm)?,
                soft_erp: float_or(ode, "soft_erp", o.soft_erp)?,
                kp: float_or(ode, "kp", o.kp)?,
                kd: float_or(ode, "kd", o.kd)?,
                max_vel: float_or(ode, "max_vel", o.max_vel)?,
                min_depth: float_or(ode, "min_depth", o.min_depth)?,
            }
        }
        None => d.ode.clone(),
    };

    let bullet = match elem.child("bullet") {
        Some(bullet) => {
            let b = BulletContact::default();
            BulletContact {
                split_impulse: bool_or(bullet, "split_impulse", b.split_impulse)?,
                split_impulse_penetration_threshold: float_or(
                    bullet,
                    "split_impulse_penetration_threshold",
                    b.split_impulse_penetration_threshold,
                )?,
                soft_cfm: float_or(bullet, "soft_cfm", b.soft_cfm)?,
                soft_erp: float_or(bullet, "soft_erp", b.soft_erp)?,
                kp: float_or(bullet, "kp", b.kp)?,
                kd: float_or(bullet, "kd", b.kd)?,
            }
        }
        None => d.bullet.clone(),
    };

    Ok(Contact {
        collide_without_contact: bool_or(
            elem,
            "collide_without_contact",
            d.collide_without_contact,
        )?,
        collide_without_contact_bitmask: bitmask_or(
            elem,
            "collide_without_contact_bitmask",
            d.collide_without_contact_bitmask,
        )?,
        collide_bitmask: bitmask_or(elem, "collide_bitmask", d.collide_bitmask)?,
        ode,
        bullet,
    })
}

fn parse_joint(elem: &Element) -> ParseResult<Joint> {
    let mut joint = Joint::new(elem.attr("name").unwrap_or(Joint::DEFAULT_NAME));
    joint.parent = elem.child_text("parent").unwrap_or("").to_string();
    joint.child = elem.child_text("child").unwrap_or("").to_string();
    if let Some(kind) = elem.attr("type") {
        joint.kind = kind.to_string();
    }
    joint.pose = pose_of(elem)?;

    if let Some(axis_elem) = elem.child("axis") {
        joint.axis = vec3_or(axis_elem, "xyz", DVec3::ZERO)?;

        if let Some(limit_elem) = axis_elem.child("limit") {
            joint.limit = Limit {
                lower: float_or(limit_elem, "lower", 0.0)?,
                upper: float_or(limit_elem, "upper", 0.0)?,
                effort: float_opt(limit_elem, "effort")?,
                velocity: float_opt(limit_elem, "velocity")?,
            };
        }

        if let Some(dynamics_elem) = axis_elem.child("dynamics") {
            joint.dynamics = Dynamics {
                damping: float_or(dynamics_elem, "damping", 0.0)?,
                friction: float_or(dynamics_elem, "friction", 0.0)?,
            };
        }
    }

    Ok(joint)
}

// ============================================================================
// Leaf helpers
// ============================================================================

/// The `<pose>` child of `elem`, or identity.
fn pose_of(elem: &Element) -> ParseResult<Pose> {
    match elem.child_text("pose") {
        Some(text) => parse_pose(text),
        None => Ok(Pose::IDENTITY),
    }
}

/// Parse whitespace-separated floats.
fn parse_floats(text: &str, element: &str) -> ParseResult<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                element: element.to_string(),
                text: text.to_string(),
            })
        })
        .collect()
}

/// A float child; blank or missing text takes the default.
fn float_or(elem: &Element, name: &str, default: f64) -> ParseResult<f64> {
    Ok(float_opt(elem, name)?.unwrap_or(default))
}

/// A float child that stays `None` when missing or blank.
fn float_opt(elem: &Element, name: &str) -> ParseResult<Option<f64>> {
    match elem.child_text(name) {
        Some(text) if !text.is_empty() => {
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| ParseError::InvalidNumber {
                    element: name.to_string(),
                    text: text.to_string(),
                })
        }
        _ => Ok(None),
    }
}

/// A 3-vector child, padded from `default` when short.
fn vec3_or(elem: &Element, name: &str, default: DVec3) -> ParseResult<DVec3> {
    let Some(text) = elem.child_text(name) else {
        return Ok(default);
    };

    let values = parse_floats(text, name)?;
    let mut v = default.to_array();
    for (slot, value) in v.iter_mut().zip(&values) {
        *slot = *value;
    }
    Ok(DVec3::from_array(v))
}

fn bool_or(elem: &Element, name: &str, default: bool) -> ParseResult<bool> {
    match elem.child_text(name) {
        Some(text) if !text.is_empty() => match text.to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ParseError::InvalidBool {
                element: name.to_string(),
                text: text.to_string(),
            }),
        },
        _ => Ok(default),
    }
}

fn bitmask_or(elem: &Element, name: &str, default: u32) -> ParseResult<u32> {
    match elem.child_text(name) {
        Some(text) if !text.is_empty() => {
            let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => text.parse::<u32>(),
            };
            parsed.map_err(|_| ParseError::InvalidNumber {
                element: name.to_string(),
                text: text.to_string(),
            })
        }
        _ => Ok(default),
    }
}
