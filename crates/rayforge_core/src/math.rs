//! Vector/matrix aliases used throughout the engine.
//!
//! `glam` already provides exactly the layouts this engine needs (32-bit
//! float components, column-major 4x4 matrices), so these are re-exports
//! rather than new types.

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// 3 unsigned bytes, e.g. an 8-bit quantized RGB pixel.
pub type U8Vec3 = glam::U8Vec3;

/// 3 unsigned 32-bit ints, e.g. a triangle's three vertex indices.
pub type U32Vec3 = glam::UVec3;
