//! Mesh naming and resolution.
//!
//! Visual meshes referenced by a model are converted by an external program
//! into the interchange format, imported into a content store and collected
//! into a [`MeshMap`] keyed by display name.

mod converter;
mod naming;
mod resolver;
mod store;

pub use converter::*;
pub use naming::*;
pub use resolver::*;
pub use store::*;
