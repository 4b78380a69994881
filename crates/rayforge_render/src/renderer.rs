//! The render pass driver: geometry (re)build, tile dispatch, post-pipeline
//! and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3;

use rayforge_animation::AnimationState;
use rayforge_core::{RenderError, RenderStatus, Result};
use rayforge_geometry::{generate_geometries, update_geometries, Geometry, GeometryBuildError};
use rayforge_intersect::Intersector;
use rayforge_scene::{Animation, Model};

use crate::camera::{Camera, Projection};
use crate::image::ImageBuffer;
use crate::params::{RenderParams, ShadingMode};
use crate::shading::{path_trace_sample, primary_hit_aovs, shade_albedo, shade_classic, shade_normal, ShadingContext};
use crate::tile::{dispatch, partition};

fn geometry_err_to_render_err(e: GeometryBuildError) -> RenderError {
    match e {
        GeometryBuildError::InvalidPrimitive(msg) | GeometryBuildError::InvalidAnimation(msg) => {
            RenderError::InvalidInput(msg)
        }
        GeometryBuildError::Intersector(err) => RenderError::IntersectorCommit(err.to_string()),
    }
}

/// Owns the intersector and the live geometry bindings across render
/// passes. A model switch calls [`Renderer::rebuild`]; ordinary animated
/// playback just calls [`Renderer::render`] again with an advanced `time`.
///
/// Also owns the progressive radiance accumulator: repeated `render` calls
/// against the same built scene keep adding samples until `params.max_samples`
/// is reached, rather than each call restarting from scratch.
pub struct Renderer {
    intersector: Intersector,
    geometries: Vec<Geometry>,
    animation_state: Option<AnimationState>,
    built: bool,
    accumulated: Vec<Vec3>,
    samples_accumulated: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            intersector: Intersector::new(),
            geometries: Vec::new(),
            animation_state: None,
            built: false,
            accumulated: Vec::new(),
            samples_accumulated: 0,
        }
    }

    /// Forces the next [`Renderer::render`] call to re-walk the scene graph
    /// from scratch and restart progressive accumulation — call this after
    /// swapping in a new [`Model`].
    pub fn rebuild(&mut self) {
        self.built = false;
        self.animation_state = None;
        self.accumulated.clear();
        self.samples_accumulated = 0;
    }

    /// Runs one render pass into `image`: rebuilds geometry on first use or
    /// after [`Renderer::rebuild`], re-evaluates `animation` at `time` when
    /// present, dispatches tiles for one sample (classic/debug modes) or up
    /// to `params.samples` additional samples (path tracing) bounded by the
    /// `params.max_samples` progressive cap, checking `cancel` between
    /// samples, then runs the tone-map/quantize pipeline.
    ///
    /// A scene rebuild (first use, `rebuild()`, or a live animation update)
    /// resets the progressive accumulator; otherwise repeated calls with an
    /// unchanged scene keep refining the same image toward `max_samples`.
    pub fn render(
        &mut self,
        model: &Model,
        camera: &Camera,
        animation: Option<&Animation>,
        time: f32,
        image: &mut ImageBuffer,
        params: &RenderParams,
        cancel: &AtomicBool,
    ) -> Result<RenderStatus> {
        params.validate().map_err(RenderError::InvalidInput)?;

        let mut scene_changed = false;
        if !self.built {
            self.geometries = generate_geometries(model, &mut self.intersector).map_err(geometry_err_to_render_err)?;
            if let Some(anim) = animation {
                self.animation_state = Some(AnimationState::new(anim));
            }
            self.built = true;
            scene_changed = true;
        } else if let Some(anim) = animation {
            let state = self.animation_state.get_or_insert_with(|| AnimationState::new(anim));
            update_geometries(model, &mut self.geometries, &mut self.intersector, Some(anim), state, time)
                .map_err(geometry_err_to_render_err)?;
            scene_changed = true;
        }

        let pixel_count = (image.width() as usize) * (image.height() as usize);
        if scene_changed || self.accumulated.len() != pixel_count {
            self.accumulated = vec![Vec3::ZERO; pixel_count];
            self.samples_accumulated = 0;
        }

        let target_total = if params.mode == ShadingMode::PathTracing { params.max_samples } else { 1 };
        let requested_this_call = if params.mode == ShadingMode::PathTracing { params.samples } else { 1 };
        let to_run = requested_this_call.min(target_total.saturating_sub(self.samples_accumulated));

        let mut effective_camera = camera.clone();
        if params.equirectangular {
            effective_camera.projection = Projection::Equirectangular;
        }

        let mut samples_done = 0u32;
        for _ in 0..to_run {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            run_sample_pass(&self.intersector, model, &effective_camera, params, image, &mut self.accumulated);
            samples_done += 1;
        }
        self.samples_accumulated += samples_done;

        let divisor = self.samples_accumulated.max(1) as f32;
        for (dst, &acc) in image.radiance.iter_mut().zip(&self.accumulated) {
            *dst = acc / divisor;
        }

        image.update_ldr(params.tone_map);

        if samples_done < to_run {
            Ok(RenderStatus::Cancelled { samples_so_far: self.samples_accumulated })
        } else {
            Ok(RenderStatus::Completed { samples: self.samples_accumulated })
        }
    }
}

fn pixel_to_ndc(x: u32, y: u32, width: u32, height: u32, aspect: f32, jitter: (f32, f32)) -> (f32, f32) {
    let px = (x as f32 + 0.5 + jitter.0) / width as f32;
    let py = (y as f32 + 0.5 + jitter.1) / height as f32;
    let x_ndc = aspect * (2.0 * px - 1.0);
    let y_ndc = 1.0 - 2.0 * py;
    (x_ndc, y_ndc)
}

/// Dispatches one sample over every tile, adding each pixel's radiance into
/// `accumulated` (not `image.radiance` directly — the caller normalizes by
/// the running sample count) and overwriting `image.normal_aov`/`albedo_aov`
/// with the primary-hit values, independent of `params.mode`.
fn run_sample_pass(
    intersector: &Intersector,
    model: &Model,
    camera: &Camera,
    params: &RenderParams,
    image: &mut ImageBuffer,
    accumulated: &mut [Vec3],
) {
    let tiles = partition(image.width(), image.height(), params.tile_size);
    let width = image.width();
    let height = image.height();
    let aspect = camera.aspect();
    let ctx = ShadingContext { intersector, model, params, far: camera.tfar, diagnostics: &image.non_finite_samples };

    dispatch(&tiles, width, accumulated, &mut image.normal_aov, &mut image.albedo_aov, |x, y, rng| {
        let jitter = if params.super_sample { (rng.uniform01_f32() - 0.5, rng.uniform01_f32() - 0.5) } else { (0.0, 0.0) };
        let (x_ndc, y_ndc) = pixel_to_ndc(x, y, width, height, aspect, jitter);
        let lens = (rng.uniform01_f32(), rng.uniform01_f32());
        let ray = camera.ray_for(x_ndc, y_ndc, lens.0, lens.1);

        let radiance = match params.mode {
            ShadingMode::Albedo => shade_albedo(&ctx, &ray),
            ShadingMode::Normal => shade_normal(&ctx, &ray),
            ShadingMode::Classic => shade_classic(&ctx, &ray, rng),
            ShadingMode::PathTracing => path_trace_sample(&ctx, ray, rng),
        };
        let (albedo, normal) = primary_hit_aovs(&ctx, &ray);
        (radiance, normal, albedo)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec2, Vec4};
    use rayforge_scene::{Material, Mesh, MaterialKind, Node};
    use std::sync::atomic::AtomicBool;

    fn lit_quad_model() -> Model {
        let mut model = Model::new();
        let mut material = Material::default();
        material.kind = MaterialKind::Reflection;
        material.base_color_factor = Vec4::ONE;
        let material_key = model.materials.insert(material);

        let primitive = rayforge_scene::Primitive {
            positions: vec![
                Vec3::new(-10.0, -10.0, 0.0),
                Vec3::new(10.0, -10.0, 0.0),
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(-10.0, 10.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            texcoords0: vec![Vec2::ZERO; 4],
            tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4],
            triangles: vec![glam::UVec3::new(0, 1, 2), glam::UVec3::new(0, 2, 3)],
            material: material_key,
            untextured: true,
        };
        let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
        let mut node = Node::new(Mat4::IDENTITY);
        node.mesh = Some(mesh);
        let node_key = model.nodes.insert(node);
        model.scenes.push(vec![node_key]);
        model
    }

    #[test]
    fn empty_scene_renders_to_black() {
        let model = Model::new();
        let mut camera = Camera::new(4, 4, 60.0);
        camera.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let mut image = ImageBuffer::new(4, 4);
        let params = RenderParams::default();
        let cancel = AtomicBool::new(false);

        let mut renderer = Renderer::new();
        let status = renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();
        assert_eq!(status, RenderStatus::Completed { samples: 1 });
        assert!(image.radiance.iter().all(|&c| c == Vec3::ZERO));
    }

    #[test]
    fn classic_pass_lights_a_facing_quad() {
        let model = lit_quad_model();
        let mut camera = Camera::new(4, 4, 60.0);
        camera.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let mut image = ImageBuffer::new(4, 4);
        let params = RenderParams::default();
        let cancel = AtomicBool::new(false);

        let mut renderer = Renderer::new();
        renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();
        let center = image.radiance[(2 * 4 + 2) as usize];
        assert!(center.length() > 0.0);
    }

    #[test]
    fn cancelling_before_any_sample_reports_zero_samples() {
        let model = lit_quad_model();
        let mut camera = Camera::new(4, 4, 60.0);
        camera.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let mut image = ImageBuffer::new(4, 4);
        let params =
            RenderParams { mode: ShadingMode::PathTracing, samples: 4, max_samples: 4, ..RenderParams::default() };
        let cancel = AtomicBool::new(true);

        let mut renderer = Renderer::new();
        let status = renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();
        assert_eq!(status, RenderStatus::Cancelled { samples_so_far: 0 });
    }

    #[test]
    fn invalid_params_are_rejected_before_any_work() {
        let model = Model::new();
        let camera = Camera::new(4, 4, 60.0);
        let mut image = ImageBuffer::new(4, 4);
        let params = RenderParams { samples: 0, ..RenderParams::default() };
        let cancel = AtomicBool::new(false);

        let mut renderer = Renderer::new();
        let result = renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel);
        assert!(result.is_err());
    }
}
