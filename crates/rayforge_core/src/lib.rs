//! Core types shared by every Rayforge crate.
//!
//! Math aliases, error types, and the deterministic PRNG the tile scheduler
//! seeds per tile.

pub mod error;
pub mod math;
pub mod rng;

pub use error::{RenderError, RenderStatus, Result};
pub use math::{Mat4, U32Vec3, U8Vec3, Vec2, Vec3, Vec4};
pub use rng::RngState;
