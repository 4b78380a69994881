//! Renders a small procedural scene (ground plane + sphere) to `out.png`
//! using only the engine's procedural builders — no glTF/OBJ asset needed.

use std::sync::atomic::AtomicBool;

use glam::{Mat4, Vec3};

use rayforge_core::RenderStatus;
use rayforge_geometry::{add_ground_plane, add_sphere};
use rayforge_render::{Camera, ImageBuffer, RenderParams, Renderer, ShadingMode};
use rayforge_scene::{Material, MaterialKind, Model};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 384;

fn build_scene() -> Model {
    let mut model = Model::new();

    let mut ground = Material::default();
    ground.base_color_factor = glam::Vec4::new(0.6, 0.6, 0.65, 1.0);
    let ground_material = model.materials.insert(ground);
    add_ground_plane(&mut model, ground_material, Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)), 20.0);

    let mut sphere = Material::default();
    sphere.base_color_factor = glam::Vec4::new(0.85, 0.2, 0.2, 1.0);
    sphere.kind = MaterialKind::Reflection;
    let sphere_material = model.materials.insert(sphere);
    add_sphere(&mut model, sphere_material, Mat4::from_translation(Vec3::new(0.0, 0.0, 0.0)), 1.0, 32, 16);

    model
}

fn main() {
    env_logger::init();

    let model = build_scene();
    model.validate().expect("procedural scene must validate");

    let mut camera = Camera::new(WIDTH, HEIGHT, 45.0);
    camera.look_at(Vec3::new(0.0, 1.5, -6.0), Vec3::new(0.0, 0.0, 0.0), Vec3::Y);

    let mut image = ImageBuffer::new(WIDTH, HEIGHT);
    let params = RenderParams { mode: ShadingMode::Classic, ao_sample: 8, ..RenderParams::default() };
    let cancel = AtomicBool::new(false);

    let mut renderer = Renderer::new();
    let status = renderer
        .render(&model, &camera, None, 0.0, &mut image, &params, &cancel)
        .expect("render pass failed");

    match status {
        RenderStatus::Completed { samples } => log::debug!("completed pass with {samples} samples"),
        RenderStatus::Cancelled { samples_so_far } => log::warn!("pass cancelled after {samples_so_far} samples"),
    }

    let mut bytes = Vec::with_capacity((WIDTH * HEIGHT * 3) as usize);
    for pixel in &image.ldr {
        bytes.extend_from_slice(&[pixel.x, pixel.y, pixel.z]);
    }

    image::save_buffer("out.png", &bytes, WIDTH, HEIGHT, image::ColorType::Rgb8).expect("failed to write out.png");
    println!("wrote out.png ({WIDTH}x{HEIGHT})");
}
