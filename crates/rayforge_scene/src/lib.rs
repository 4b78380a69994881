//! The neutral scene/data model: textures, materials, meshes, nodes, animations.
//!
//! A `SlotMap`-backed arena per entity kind, with stable keys standing in for
//! a pointer-heavy shared-ownership graph. `Model` is the sole owner of every
//! arena; everything else — `Node`, `Geometry` — refers to other entities by
//! key, never by back-pointer.

pub mod animation;
pub mod material;
pub mod mesh;
pub mod model;
pub mod node;
pub mod texture;

pub use animation::{Animation, AnimationChannel, AnimationSampler, Interpolation, TargetPath};
pub use material::{Material, MaterialKind};
pub use mesh::{Mesh, Primitive};
pub use model::Model;
pub use node::Node;
pub use texture::{Texture, WrapMode};

slotmap::new_key_type! {
    /// Stable handle to a [`Texture`] inside a [`Model`].
    pub struct TextureKey;
    /// Stable handle to a [`Material`] inside a [`Model`].
    pub struct MaterialKey;
    /// Stable handle to a [`Mesh`] inside a [`Model`].
    pub struct MeshKey;
    /// Stable handle to a [`Node`] inside a [`Model`].
    pub struct NodeKey;
    /// Stable handle to an [`Animation`] inside a [`Model`].
    pub struct AnimationKey;
}
