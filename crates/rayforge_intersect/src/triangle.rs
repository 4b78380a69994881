use glam::{UVec3, Vec3, Vec4};

/// Sentinel `geom_id` returned by `intersect1` on a miss.
pub const INVALID_GEOM_ID: u32 = u32::MAX;

/// Per-vertex attribute slots a geometry may carry. The
/// numbering is part of the external contract: loaders and the geometry
/// builder address slots by this enum, never a raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSlot {
    Normal = 0,
    Texcoord0 = 1,
    Tangent = 2,
    Bitangent = 3,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 4] =
        [AttributeSlot::Normal, AttributeSlot::Texcoord0, AttributeSlot::Tangent, AttributeSlot::Bitangent];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The raw vertex/index/attribute buffers `new_geometry` allocates and the
/// geometry builder writes into directly.
///
/// Attribute buffers are stored as `Vec4` uniformly regardless of their
/// logical width (`Normal`/`Bitangent` use only `xyz`, `Texcoord0` only
/// `xy`) so a single indexed array covers all four slots.
#[derive(Debug, Clone)]
pub struct PrimitiveBuffers {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<UVec3>,
    pub attributes: [Vec<Vec4>; 4],
}

impl PrimitiveBuffers {
    #[must_use]
    pub fn new(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; vertex_count],
            triangles: Vec::with_capacity(triangle_count),
            attributes: std::array::from_fn(|_| vec![Vec4::ZERO; vertex_count]),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn attribute(&self, slot: AttributeSlot) -> &[Vec4] {
        &self.attributes[slot.index()]
    }

    pub fn attribute_mut(&mut self, slot: AttributeSlot) -> &mut [Vec4] {
        &mut self.attributes[slot.index()]
    }

    /// Barycentric interpolation of a single attribute at `(u, v)` on
    /// triangle `prim_id`, following `interpolate0`'s contract:
    /// barycentric weights are `(1-u-v, u, v)` against the triangle's
    /// three vertices in winding order.
    #[must_use]
    pub fn interpolate(&self, prim_id: u32, u: f32, v: f32, slot: AttributeSlot) -> Vec4 {
        let tri = self.triangles[prim_id as usize];
        let attrs = self.attribute(slot);
        let a = attrs[tri.x as usize];
        let b = attrs[tri.y as usize];
        let c = attrs[tri.z as usize];
        let w = 1.0 - u - v;
        a * w + b * u + c * v
    }

    #[must_use]
    pub fn world_position(&self, prim_id: u32, u: f32, v: f32) -> Vec3 {
        let tri = self.triangles[prim_id as usize];
        let a = self.positions[tri.x as usize];
        let b = self.positions[tri.y as usize];
        let c = self.positions[tri.z as usize];
        let w = 1.0 - u - v;
        a * w + b * u + c * v
    }
}

/// Result of `intersect1`: the closest hit on `[tnear, tfar]`,
/// or `geom_id == INVALID_GEOM_ID` on a miss.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub geom_id: u32,
    pub prim_id: u32,
    pub u: f32,
    pub v: f32,
    pub ng: Vec3,
    pub tfar: f32,
}

impl RayHit {
    #[must_use]
    pub fn miss() -> Self {
        Self { geom_id: INVALID_GEOM_ID, prim_id: 0, u: 0.0, v: 0.0, ng: Vec3::Z, tfar: f32::INFINITY }
    }

    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.geom_id == INVALID_GEOM_ID
    }
}
