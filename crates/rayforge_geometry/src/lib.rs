//! Flattens a [`rayforge_scene::Model`]'s node forest into intersector
//! geometries and keeps them in sync with animation playback.

mod builder;
mod error;
mod procedural;
mod tangent;

pub use builder::{generate_geometries, update_geometries, Geometry};
pub use error::GeometryBuildError;
pub use procedural::{add_cube, add_ground_plane, add_sphere};
pub use tangent::ensure_attributes;
