//! The `Intersector` facade itself.

use std::sync::Arc;

use bvh::aabb::{Aabb, Bounded};
use bvh::bounding_hierarchy::{BHShape, BoundingHierarchy};
use bvh::bvh::Bvh;
use glam::{UVec3, Vec3};
use nalgebra::{Point3, Vector3};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::ray::Ray;
use crate::triangle::{PrimitiveBuffers, RayHit};

new_key_type! {
    /// Opaque handle to a geometry's buffers, valid from `new_geometry`
    /// until `release`.
    pub struct GeomHandle;
}

pub type IntersectFilter = Arc<dyn Fn(&RayHit) -> bool + Send + Sync>;

#[derive(Debug, Error)]
pub enum IntersectorError {
    #[error("geometry handle is not attached to the scene")]
    NotAttached,
    #[error("bvh build/commit failed: {0}")]
    Commit(String),
}

struct GeometryEntry {
    buffers: PrimitiveBuffers,
    user_data: Option<u64>,
    filter: Option<IntersectFilter>,
    geom_id: Option<u32>,
    dirty: bool,
}

/// A single triangle reference fed to the `bvh` crate's build/traverse
/// API. Carries just enough to recover `(geom_id, prim_id)` and the three
/// world-space corners for a precise Möller–Trumbore test after the BVH's
/// coarse AABB culling narrows the candidate set.
struct TriRef {
    geom_id: u32,
    prim_id: u32,
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
    node_index: usize,
}

impl Bounded<f32, 3> for TriRef {
    fn aabb(&self) -> Aabb<f32, 3> {
        Aabb::empty().grow(&self.v0).grow(&self.v1).grow(&self.v2)
    }
}

impl BHShape<f32, 3> for TriRef {
    fn set_bh_node_index(&mut self, index: usize) {
        self.node_index = index;
    }

    fn bh_node_index(&self) -> usize {
        self.node_index
    }
}

fn to_point(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

/// Möller–Trumbore ray-triangle intersection, returning `(t, u, v)`.
fn intersect_triangle(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<(f32, f32, f32)> {
    const EPS: f32 = 1e-8;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = dir.cross(edge2);
    let det = edge1.dot(pvec);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(edge1);
    let v = dir.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(qvec) * inv_det;
    Some((t, u, v))
}

/// Opaque adapter over an acceleration-structure library. Owns
/// every attached geometry's buffers; `commit_scene` rebuilds the
/// structure backing `intersect1`/`occluded1` from scratch, which is
/// inexpensive relative to a render pass and keeps the facade's internals
/// (a flat triangle soup) decoupled from per-geometry buffer layout.
pub struct Intersector {
    geometries: SlotMap<GeomHandle, GeometryEntry>,
    geom_id_to_handle: Vec<Option<GeomHandle>>,
    free_geom_ids: Vec<u32>,
    triangles: Vec<TriRef>,
    bvh: Option<Bvh<f32, 3>>,
}

impl Default for Intersector {
    fn default() -> Self {
        Self::new()
    }
}

impl Intersector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            geometries: SlotMap::with_key(),
            geom_id_to_handle: Vec::new(),
            free_geom_ids: Vec::new(),
            triangles: Vec::new(),
            bvh: None,
        }
    }

    /// Creates a triangle geometry with the vertex/index/attribute slots;
    /// buffers are empty until the caller (the geometry builder) writes
    /// into them via [`Self::buffers_mut`].
    pub fn new_geometry(&mut self, vertex_count: usize, triangle_count: usize) -> GeomHandle {
        let buffers = PrimitiveBuffers::new(vertex_count, triangle_count);
        self.geometries.insert(GeometryEntry { buffers, user_data: None, filter: None, geom_id: None, dirty: true })
    }

    pub fn buffers(&self, handle: GeomHandle) -> Option<&PrimitiveBuffers> {
        self.geometries.get(handle).map(|g| &g.buffers)
    }

    /// Mutable access for the geometry builder; marks the geometry dirty
    /// so the next `commit` rebuilds it into the global BVH.
    pub fn buffers_mut(&mut self, handle: GeomHandle) -> Option<&mut PrimitiveBuffers> {
        let entry = self.geometries.get_mut(handle)?;
        entry.dirty = true;
        Some(&mut entry.buffers)
    }

    pub fn set_user_data(&mut self, handle: GeomHandle, data: u64) {
        if let Some(entry) = self.geometries.get_mut(handle) {
            entry.user_data = Some(data);
        }
    }

    pub fn user_data(&self, handle: GeomHandle) -> Option<u64> {
        self.geometries.get(handle).and_then(|g| g.user_data)
    }

    /// Looks up a committed geometry's user-data by the `geom_id` a hit
    /// result carries, rather than by handle.
    #[must_use]
    pub fn user_data_by_geom_id(&self, geom_id: u32) -> Option<u64> {
        let handle = self.geom_id_to_handle.get(geom_id as usize).copied().flatten()?;
        self.user_data(handle)
    }

    /// Installs a per-geometry hit filter; `None` accepts
    /// every potential hit, which is the default.
    pub fn set_intersect_filter(&mut self, handle: GeomHandle, filter: Option<IntersectFilter>) {
        if let Some(entry) = self.geometries.get_mut(handle) {
            entry.filter = filter;
        }
    }

    /// Marks a single geometry's buffers as having been mutated in place.
    /// The next `commit_scene` rebuilds it.
    pub fn update_buffer(&mut self, handle: GeomHandle) {
        if let Some(entry) = self.geometries.get_mut(handle) {
            entry.dirty = true;
        }
    }

    /// Per-geometry commit: equivalent to `update_buffer` followed by a
    /// full-scene rebuild, since this facade keeps one flat acceleration
    /// structure rather than per-geometry ones.
    pub fn commit(&mut self, handle: GeomHandle) -> Result<(), IntersectorError> {
        self.update_buffer(handle);
        self.commit_scene()
    }

    /// Attaches a geometry to the committed scene, returning its `geom_id`.
    /// The geometry is not visible to queries until the next `commit_scene`.
    pub fn attach(&mut self, handle: GeomHandle) -> Result<u32, IntersectorError> {
        if !self.geometries.contains_key(handle) {
            return Err(IntersectorError::NotAttached);
        }
        let geom_id = self.free_geom_ids.pop().unwrap_or_else(|| {
            self.geom_id_to_handle.push(None);
            (self.geom_id_to_handle.len() - 1) as u32
        });
        self.geom_id_to_handle[geom_id as usize] = Some(handle);
        self.geometries[handle].geom_id = Some(geom_id);
        self.geometries[handle].dirty = true;
        Ok(geom_id)
    }

    /// Removes a geometry from the committed scene without freeing its
    /// buffers; the handle remains valid for `release` or re-`attach`.
    pub fn detach(&mut self, geom_id: u32) {
        if let Some(slot) = self.geom_id_to_handle.get_mut(geom_id as usize) {
            if let Some(handle) = slot.take() {
                if let Some(entry) = self.geometries.get_mut(handle) {
                    entry.geom_id = None;
                }
                self.free_geom_ids.push(geom_id);
            }
        }
    }

    /// Frees a geometry's buffers entirely.
    pub fn release(&mut self, handle: GeomHandle) {
        if let Some(entry) = self.geometries.get(handle) {
            if let Some(geom_id) = entry.geom_id {
                self.detach(geom_id);
            }
        }
        self.geometries.remove(handle);
    }

    /// Rebuilds the acceleration structure over every currently attached
    /// geometry. Must be called before any query after `new_geometry`,
    /// `attach`, `detach`, or a buffer mutation.
    pub fn commit_scene(&mut self) -> Result<(), IntersectorError> {
        self.triangles.clear();
        for (handle, geom_id) in
            self.geom_id_to_handle.iter().enumerate().filter_map(|(i, h)| h.map(|h| (h, i as u32)))
        {
            let entry = &self.geometries[handle];
            for (prim_id, tri) in entry.buffers.triangles.iter().enumerate() {
                let UVec3 { x, y, z } = *tri;
                let v0 = entry.buffers.positions[x as usize];
                let v1 = entry.buffers.positions[y as usize];
                let v2 = entry.buffers.positions[z as usize];
                self.triangles.push(TriRef {
                    geom_id,
                    prim_id: prim_id as u32,
                    v0: to_point(v0),
                    v1: to_point(v1),
                    v2: to_point(v2),
                    node_index: 0,
                });
            }
            if let Some(e) = self.geometries.get_mut(handle) {
                e.dirty = false;
            }
        }

        if self.triangles.is_empty() {
            self.bvh = None;
            return Ok(());
        }
        self.bvh = Some(Bvh::build(&mut self.triangles));
        Ok(())
    }

    fn filter_accepts(&self, geom_id: u32, hit: &RayHit) -> bool {
        let Some(handle) = self.geom_id_to_handle.get(geom_id as usize).copied().flatten() else {
            return true;
        };
        match self.geometries.get(handle).and_then(|e| e.filter.as_ref()) {
            Some(filter) => filter(hit),
            None => true,
        }
    }

    /// Closest hit on `[ray.tnear, ray.tfar]`.
    #[must_use]
    pub fn intersect1(&self, ray: &Ray) -> RayHit {
        let Some(bvh) = &self.bvh else { return RayHit::miss() };
        let bvh_ray = bvh::ray::Ray::new(to_point(ray.origin), to_vector(ray.dir));
        let candidates = bvh.traverse(&bvh_ray, &self.triangles);

        let mut best = RayHit::miss();
        let mut best_t = ray.tfar;
        for tri in candidates {
            let v0 = Vec3::new(tri.v0.x, tri.v0.y, tri.v0.z);
            let v1 = Vec3::new(tri.v1.x, tri.v1.y, tri.v1.z);
            let v2 = Vec3::new(tri.v2.x, tri.v2.y, tri.v2.z);
            let Some((t, u, v)) = intersect_triangle(ray.origin, ray.dir, v0, v1, v2) else { continue };
            if t < ray.tnear || t >= best_t {
                continue;
            }
            let ng = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            let candidate = RayHit { geom_id: tri.geom_id, prim_id: tri.prim_id, u, v, ng, tfar: t };
            if !self.filter_accepts(tri.geom_id, &candidate) {
                continue;
            }
            best_t = t;
            best = candidate;
        }
        best
    }

    /// Shadow-ray query: mutates nothing in `self`; the caller
    /// is expected to call `ray.mark_occluded()` based on the returned
    /// boolean, matching the original's "mutate `tfar`" contract without
    /// requiring `&mut self` for a read-only scene query.
    #[must_use]
    pub fn occluded1(&self, ray: &Ray) -> bool {
        let Some(bvh) = &self.bvh else { return false };
        let bvh_ray = bvh::ray::Ray::new(to_point(ray.origin), to_vector(ray.dir));
        let candidates = bvh.traverse(&bvh_ray, &self.triangles);
        for tri in candidates {
            let v0 = Vec3::new(tri.v0.x, tri.v0.y, tri.v0.z);
            let v1 = Vec3::new(tri.v1.x, tri.v1.y, tri.v1.z);
            let v2 = Vec3::new(tri.v2.x, tri.v2.y, tri.v2.z);
            let Some((t, u, v)) = intersect_triangle(ray.origin, ray.dir, v0, v1, v2) else { continue };
            if t < ray.tnear || t > ray.tfar {
                continue;
            }
            let ng = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            let candidate = RayHit { geom_id: tri.geom_id, prim_id: tri.prim_id, u, v, ng, tfar: t };
            if self.filter_accepts(tri.geom_id, &candidate) {
                return true;
            }
        }
        false
    }

    /// Barycentric interpolation of a vertex attribute.
    #[must_use]
    pub fn interpolate0(
        &self,
        geom_id: u32,
        prim_id: u32,
        u: f32,
        v: f32,
        slot: crate::triangle::AttributeSlot,
    ) -> Option<glam::Vec4> {
        let handle = self.geom_id_to_handle.get(geom_id as usize).copied().flatten()?;
        let entry = self.geometries.get(handle)?;
        Some(entry.buffers.interpolate(prim_id, u, v, slot))
    }

    #[must_use]
    pub fn world_position(&self, geom_id: u32, prim_id: u32, u: f32, v: f32) -> Option<Vec3> {
        let handle = self.geom_id_to_handle.get(geom_id as usize).copied().flatten()?;
        let entry = self.geometries.get(handle)?;
        Some(entry.buffers.world_position(prim_id, u, v))
    }
}
