//! SDF Core - Plant model import from SDF documents.
//!
//! This crate provides:
//!
//! - **Model types**: `Model`, `Link`, `Joint`, `Visual`, `Collision`
//! - **SDF support**: XML parsing into the model and a text report
//! - **Mesh resolution**: external conversion and import of visual meshes
//! - **Placement**: joint and link poses for the scene builder
//!
//! # Example
//!
//! ```ignore
//! use sdf_core::sdf::{load_sdf, report};
//!
//! let model = load_sdf("plant/model.sdf")?;
//! println!("Loaded {} links, {} joints", model.link_count(), model.joint_count());
//! print!("{}", report(&model));
//! ```

pub mod config;
pub mod mesh;
pub mod model;
pub mod placement;
pub mod sdf;

// Re-export commonly used types
pub use config::{ConfigError, ConverterConfig, ResolverSettings};
pub use mesh::{resolve_meshes, MeshContent, MeshMap, MeshResolver};
pub use model::{Collision, Geometry, Joint, Link, Mesh, Model, Visual};
pub use sdf::{load_sdf, parse_sdf_str, report};
