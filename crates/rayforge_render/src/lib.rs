//! Camera, shading kernels, tile scheduler and render pass driver.
//!
//! This is the layer that turns a committed [`rayforge_intersect::Intersector`]
//! plus a [`rayforge_scene::Model`] into pixels, one tile at a time.

mod camera;
mod image;
mod params;
mod renderer;
mod shading;
mod texture_sampler;
mod tile;

pub use camera::{Camera, Projection};
pub use image::ImageBuffer;
pub use params::{RenderParams, ShadingMode, TileSize};
pub use renderer::Renderer;
pub use shading::ShadingContext;
pub use tile::{partition, Tile};
