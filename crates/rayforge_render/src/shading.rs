//! Classic (direct + AO) and path-tracing shading kernels.

use std::sync::atomic::AtomicU64;

use glam::{Vec2, Vec3};
use rayforge_core::RngState;
use rayforge_intersect::{AttributeSlot, Intersector, Ray, RayHit};
use rayforge_scene::{Material, MaterialKey, Model};
use slotmap::{Key, KeyData};

use crate::params::RenderParams;
use crate::texture_sampler::sample_optional;

/// Shared read-only state every per-pixel kernel call needs. Borrowed for
/// the duration of a tile's work; the committed intersector scene is
/// read-only during a render pass.
pub struct ShadingContext<'a> {
    pub intersector: &'a Intersector,
    pub model: &'a Model,
    pub params: &'a RenderParams,
    /// Upper bound for continuation/shadow/AO ray `tfar` (the camera's far plane).
    pub far: f32,
    /// Counts non-finite radiance samples scrubbed to `0` during this pass.
    pub diagnostics: &'a AtomicU64,
}

fn directional_light_dir() -> Vec3 {
    Vec3::new(-1.0, -1.0, -1.0).normalize()
}

fn material_for(model: &Model, user_data: Option<u64>) -> Option<&Material> {
    let key = MaterialKey::from(KeyData::from_ffi(user_data?));
    model.materials.get(key)
}

fn to_vec2(v: glam::Vec4) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn to_vec3(v: glam::Vec4) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn shading_normal(ix: &Intersector, hit: &RayHit) -> Vec3 {
    ix.interpolate0(hit.geom_id, hit.prim_id, hit.u, hit.v, AttributeSlot::Normal)
        .map(to_vec3)
        .map(Vec3::normalize_or_zero)
        .filter(|n| *n != Vec3::ZERO)
        .unwrap_or(hit.ng)
}

fn texcoord(ix: &Intersector, hit: &RayHit) -> Vec2 {
    ix.interpolate0(hit.geom_id, hit.prim_id, hit.u, hit.v, AttributeSlot::Texcoord0).map(to_vec2).unwrap_or(Vec2::ZERO)
}

fn base_color(ctx: &ShadingContext, material: &Material, uv: Vec2) -> Vec3 {
    let tex = material.base_color_texture.and_then(|k| ctx.model.textures.get(k));
    let sampled = sample_optional(tex, uv, true);
    (material.base_color_factor * sampled).truncate()
}

fn emissive(ctx: &ShadingContext, material: &Material, uv: Vec2) -> Vec3 {
    let tex = material.emissive_texture.and_then(|k| ctx.model.textures.get(k));
    let sampled = sample_optional(tex, uv, true).truncate();
    material.emissive_factor * sampled
}

/// Samples a uniformly-distributed point inside the unit sphere via
/// rejection sampling from the enclosing cube.
fn random_in_unit_sphere(rng: &mut RngState) -> Vec3 {
    loop {
        let p = Vec3::new(
            2.0 * rng.uniform01_f32() - 1.0,
            2.0 * rng.uniform01_f32() - 1.0,
            2.0 * rng.uniform01_f32() - 1.0,
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Classic direct + shadow + ambient-occlusion estimator.
/// Returns background (black) on a primary miss.
pub fn shade_classic(ctx: &ShadingContext, ray: &Ray, rng: &mut RngState) -> Vec3 {
    let hit = ctx.intersector.intersect1(ray);
    if hit.is_miss() {
        return Vec3::ZERO;
    }

    let p = ray.point_at(hit.tfar);
    let n = shading_normal(ctx.intersector, &hit);
    let uv = texcoord(ctx.intersector, &hit);
    let Some(material) = material_for(ctx.model, ctx.intersector.user_data_by_geom_id(hit.geom_id)) else {
        return Vec3::ZERO;
    };
    let albedo = base_color(ctx, material, uv);

    let mut color = 0.5 * albedo;

    let light_dir = directional_light_dir();
    let n_dot_l = (-light_dir).dot(n).max(0.0);
    if n_dot_l > 0.0 {
        let shadow_ray = Ray::new(p, -light_dir, 1e-3, ctx.far);
        if !ctx.intersector.occluded1(&shadow_ray) {
            color += albedo * n_dot_l;
        }
    }

    if ctx.params.ao_sample > 0 {
        let mut occluded = 0u32;
        for _ in 0..ctx.params.ao_sample {
            let target = p + n + random_in_unit_sphere(rng);
            let to_target = target - p;
            let distance = to_target.length();
            if distance < 1e-6 {
                continue;
            }
            let ao_ray = Ray::new(p, to_target / distance, 1e-4, distance);
            if ctx.intersector.occluded1(&ao_ray) {
                occluded += 1;
            }
        }
        color *= 1.0 - (occluded as f32 / ctx.params.ao_sample as f32);
    }

    color
}

/// One full path to termination, returning its single-sample radiance
/// contribution. The caller accumulates this
/// across `samples` draws per pixel and divides by the running count.
pub fn path_trace_sample(ctx: &ShadingContext, mut ray: Ray, rng: &mut RngState) -> Vec3 {
    let mut l = Vec3::ZERO;
    let mut beta = Vec3::ONE;
    let mut depth: u32 = 0;

    loop {
        let hit = ctx.intersector.intersect1(&ray);
        if hit.is_miss() {
            break;
        }

        let Some(material) = material_for(ctx.model, ctx.intersector.user_data_by_geom_id(hit.geom_id)) else {
            break;
        };
        let uv = texcoord(ctx.intersector, &hit);
        let color = base_color(ctx, material, uv);
        let emissive_color = emissive(ctx, material, uv);

        let mut rho_max = color.max_element();
        if depth > ctx.params.depth_limit {
            rho_max *= 0.5_f32.powi((depth - ctx.params.depth_limit) as i32);
        }

        let russian = if depth > ctx.params.depth_min {
            if rng.uniform01_f32() >= rho_max {
                l += beta * emissive_color;
                break;
            }
            rho_max
        } else {
            1.0
        };

        l += beta * emissive_color;

        let n = shading_normal(ctx.intersector, &hit);
        let reference = if n.x.abs() > 1e-1 { Vec3::Y } else { Vec3::X };
        let u_axis = reference.cross(n).normalize_or_zero();
        let v_axis = n.cross(u_axis);

        let r1 = std::f32::consts::TAU * rng.uniform01_f32();
        let r2 = rng.uniform01_f32();
        let sqrt_r2 = r2.sqrt();
        let dir = (u_axis * (r1.cos() * sqrt_r2) + v_axis * (r1.sin() * sqrt_r2) + n * (1.0 - r2).max(0.0).sqrt())
            .normalize_or_zero();

        beta *= color / russian.max(1e-6);

        let p = ray.point_at(hit.tfar);
        ray = Ray::new(p + n * 1e-3, dir, 1e-3, ctx.far);
        depth += 1;
    }

    crate::image::sanitize_counted(l, ctx.diagnostics)
}

/// Primary-hit albedo and shading normal, independent of `params.mode` —
/// used to populate `ImageBuffer::albedo_aov`/`normal_aov` on every pass
/// regardless of which kernel is shading the pixel's radiance.
pub fn primary_hit_aovs(ctx: &ShadingContext, ray: &Ray) -> (Vec3, Vec3) {
    let hit = ctx.intersector.intersect1(ray);
    if hit.is_miss() {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    let n = shading_normal(ctx.intersector, &hit);
    let uv = texcoord(ctx.intersector, &hit);
    let albedo = material_for(ctx.model, ctx.intersector.user_data_by_geom_id(hit.geom_id))
        .map(|m| base_color(ctx, m, uv))
        .unwrap_or(Vec3::ZERO);
    (albedo, n)
}

/// Debug kernel for [`crate::params::ShadingMode::Albedo`]: the shaded
/// point's base color with no lighting applied, background black on a miss.
pub fn shade_albedo(ctx: &ShadingContext, ray: &Ray) -> Vec3 {
    let hit = ctx.intersector.intersect1(ray);
    if hit.is_miss() {
        return Vec3::ZERO;
    }
    let uv = texcoord(ctx.intersector, &hit);
    let Some(material) = material_for(ctx.model, ctx.intersector.user_data_by_geom_id(hit.geom_id)) else {
        return Vec3::ZERO;
    };
    base_color(ctx, material, uv)
}

/// Debug kernel for [`crate::params::ShadingMode::Normal`]: the shading
/// normal remapped from `[-1, 1]` to `[0, 1]`, background black on a miss.
pub fn shade_normal(ctx: &ShadingContext, ray: &Ray) -> Vec3 {
    let hit = ctx.intersector.intersect1(ray);
    if hit.is_miss() {
        return Vec3::ZERO;
    }
    shading_normal(ctx.intersector, &hit) * 0.5 + Vec3::splat(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use rayforge_scene::{Material, MaterialKind, Mesh, Model, Node};

    fn enclosing_emissive_sphere() -> (Model, RenderParams) {
        let mut model = Model::new();
        let mut material = Material::default();
        material.kind = MaterialKind::Reflection;
        material.emissive_factor = Vec3::ONE;
        let material_key = model.materials.insert(material);

        let mut positions = Vec::new();
        let mut triangles = Vec::new();
        let radius = 100.0;
        for i in 0..8u32 {
            let a = (i as f32 / 8.0) * std::f32::consts::TAU;
            let b = ((i + 1) as f32 / 8.0) * std::f32::consts::TAU;
            positions.push(Vec3::ZERO);
            positions.push(Vec3::new(a.cos(), a.sin(), 1.0) * radius);
            positions.push(Vec3::new(b.cos(), b.sin(), 1.0) * radius);
            let base = i * 3;
            triangles.push(glam::UVec3::new(base, base + 1, base + 2));
        }
        let n = positions.len();
        let mut primitive = rayforge_scene::Primitive {
            positions,
            normals: vec![Vec3::Z; n],
            texcoords0: vec![Vec2::ZERO; n],
            tangents: vec![glam::Vec4::new(1.0, 0.0, 0.0, 1.0); n],
            triangles,
            material: material_key,
            untextured: true,
        };
        // Flip normals inward so rays from the origin hit a front face.
        for normal in &mut primitive.normals {
            *normal = -*normal;
        }

        let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
        let mut node = Node::new(Mat4::IDENTITY);
        node.mesh = Some(mesh);
        let node_key = model.nodes.insert(node);
        model.scenes.push(vec![node_key]);

        (model, RenderParams::default())
    }

    #[test]
    fn path_trace_hits_emissive_surface_on_first_bounce() {
        let (model, params) = enclosing_emissive_sphere();
        let mut ix = rayforge_intersect::Intersector::new();
        let _geoms = rayforge_geometry::generate_geometries(&model, &mut ix).unwrap();

        let diagnostics = AtomicU64::new(0);
        let ctx = ShadingContext { intersector: &ix, model: &model, params: &params, far: 1e6, diagnostics: &diagnostics };
        let mut rng = RngState::seed_from_tile(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0).normalize(), 1e-3, 1e6);
        let l = path_trace_sample(&ctx, ray, &mut rng);
        assert!(l.x > 0.9 && l.y > 0.9 && l.z > 0.9);
    }

    #[test]
    fn classic_shading_on_empty_scene_is_black() {
        let model = Model::new();
        let ix = rayforge_intersect::Intersector::new();
        let params = RenderParams::default();
        let diagnostics = AtomicU64::new(0);
        let ctx = ShadingContext { intersector: &ix, model: &model, params: &params, far: 1e6, diagnostics: &diagnostics };
        let mut rng = RngState::seed_from_tile(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 1e-3, 1e6);
        assert_eq!(shade_classic(&ctx, &ray, &mut rng), Vec3::ZERO);
    }
}
