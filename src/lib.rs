//! Rayforge: a tiled CPU path/Whitted-style ray tracer engine.
//!
//! This crate re-exports the public surface of the workspace's member
//! crates and defines the one boundary the core deliberately stops short
//! of: loading a [`Model`] from an on-disk asset. glTF/OBJ parsing is a
//! loader's job, not the engine's — [`ModelLoader`] is the trait a host
//! application implements to hand the engine a scene.

pub use rayforge_animation::{AnimatedTransform, AnimationState, Cursor};
pub use rayforge_core::{Mat4, RenderError, RenderStatus, Result, RngState, U32Vec3, U8Vec3, Vec2, Vec3, Vec4};
pub use rayforge_geometry::{
    add_cube, add_ground_plane, add_sphere, generate_geometries, update_geometries, Geometry, GeometryBuildError,
};
pub use rayforge_intersect::{GeomHandle, Intersector, IntersectorError, Ray, RayHit};
pub use rayforge_render::{Camera, ImageBuffer, Projection, RenderParams, Renderer, ShadingMode, Tile, TileSize};
pub use rayforge_scene::{
    Animation, AnimationChannel, AnimationSampler, Interpolation, Material, MaterialKey, MaterialKind, Mesh,
    MeshKey, Model, Node, NodeKey, Primitive, TargetPath, Texture, TextureKey, WrapMode,
};

/// Supplies a [`Model`] from whatever on-disk or in-memory asset format a
/// host application supports.
///
/// Implementors are responsible for every normalization step the engine
/// assumes already happened: collapsing TRS to a single `local_matrix`,
/// flipping texcoord `v`, converting images to linear float RGBA, and
/// rejecting non-triangle primitives. The engine itself never parses an
/// asset format — this crate ships no implementation of this trait.
pub trait ModelLoader {
    type Error: std::error::Error;

    fn load(&self) -> std::result::Result<Model, Self::Error>;
}
