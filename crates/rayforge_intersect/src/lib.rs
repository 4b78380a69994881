//! Opaque intersector facade, implemented over the `bvh` crate.
//!
//! CPU ray-triangle acceleration isn't something a GPU rasterizer needs, so
//! this crate reaches for the `bvh` crate from the wider ecosystem. Everything
//! else here — the handle/slotmap arena style, the `thiserror` error type —
//! follows the rest of the workspace.

mod facade;
mod ray;
mod triangle;

pub use facade::{GeomHandle, Intersector, IntersectorError};
pub use ray::Ray;
pub use triangle::{AttributeSlot, PrimitiveBuffers, RayHit, INVALID_GEOM_ID};
