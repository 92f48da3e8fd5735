//! SDF (Simulation Description Format) support.
//!
//! This module reads SDF XML documents into the normalized [`Model`](crate::model::Model)
//! and produces a text summary of the result.
//!
//! ## Supported SDF Features
//!
//! - Links with pose, inertial, visuals and collisions
//! - Geometry: mesh, box, cylinder, sphere
//! - Collision surfaces (friction, bounce, contact)
//! - Joints with axis, limit and dynamics
//!
//! ## Not Supported
//!
//! - `<include>` and nested models (the first `<model>` found is used)
//! - `relative_to` frames on poses
//! - Worlds, sensors, plugins, lights
//!
//! # Example
//!
//! ```ignore
//! use sdf_core::sdf::{load_sdf, report};
//!
//! let model = load_sdf("plant/model.sdf")?;
//! print!("{}", report(&model));
//! ```

mod loader;
mod parser;
mod report;
mod xml;

pub use loader::*;
pub use parser::*;
pub use report::*;
pub use xml::{parse_document, Element};
