//! End-to-end render-pass scenarios.

use std::sync::atomic::AtomicBool;

use glam::{Mat4, UVec3, Vec2, Vec3, Vec4};

use rayforge::{
    Animation, AnimationChannel, AnimationSampler, Camera, ImageBuffer, Interpolation, Material, MaterialKind, Mesh,
    Model, Node, Primitive, RenderError, RenderParams, RenderStatus, Renderer, ShadingMode, TargetPath,
};

fn cancel_flag(value: bool) -> AtomicBool {
    AtomicBool::new(value)
}

/// Scenario 1: empty scene renders fully black.
#[test]
fn scenario_1_empty_scene_is_black() {
    let model = Model::new();
    let mut camera = Camera::new(4, 4, 60.0);
    camera.look_at(Vec3::ZERO, Vec3::Z, Vec3::Y);
    let mut image = ImageBuffer::new(4, 4);
    let params = RenderParams::default();
    let cancel = cancel_flag(false);

    let mut renderer = Renderer::new();
    renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();

    assert!(image.radiance.iter().all(|&c| c == Vec3::ZERO));
    assert!(image.ldr.iter().all(|&c| c == glam::U8Vec3::ZERO));
}

fn single_plane_model(base_color: Vec4) -> Model {
    let mut model = Model::new();
    let mut material = Material::default();
    material.base_color_factor = base_color;
    material.kind = MaterialKind::Reflection;
    let material_key = model.materials.insert(material);

    let half = 1000.0;
    let primitive = Primitive {
        positions: vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(half, 0.0, half),
            Vec3::new(-half, 0.0, half),
        ],
        normals: vec![Vec3::Y; 4],
        texcoords0: vec![Vec2::ZERO; 4],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4],
        triangles: vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
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

/// Scenario 2: a white plane filling the view under the fixed directional
/// light, `ao_sample = 0`. `radiance ≈ 0.5·(1,1,1) + (1/√3)·(1,1,1)`;
/// LDR after tone map + gamma + clamp saturates to `(255,255,255)`.
#[test]
fn scenario_2_directional_light_on_white_plane() {
    let model = single_plane_model(Vec4::ONE);
    let mut camera = Camera::new(2, 2, 90.0);
    camera.look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::Z);
    let mut image = ImageBuffer::new(2, 2);
    let params = RenderParams { ao_sample: 0, ..RenderParams::default() };
    let cancel = cancel_flag(false);

    let mut renderer = Renderer::new();
    renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();

    let expected = 0.5 + 1.0 / 3.0_f32.sqrt();
    for c in &image.radiance {
        assert!((c.x - expected).abs() < 1e-2, "got {c:?}, expected ~{expected}");
        assert!((c.y - expected).abs() < 1e-2);
        assert!((c.z - expected).abs() < 1e-2);
    }
    for c in &image.ldr {
        assert_eq!(*c, glam::U8Vec3::new(255, 255, 255));
    }
}

fn enclosing_emissive_sphere_model() -> Model {
    let mut model = Model::new();
    let mut material = Material::default();
    material.kind = MaterialKind::Reflection;
    material.emissive_factor = Vec3::ONE;
    let material_key = model.materials.insert(material);

    let mut positions = Vec::new();
    let mut triangles = Vec::new();
    let radius = 1000.0;
    for i in 0..8u32 {
        let a = (i as f32 / 8.0) * std::f32::consts::TAU;
        let b = ((i + 1) as f32 / 8.0) * std::f32::consts::TAU;
        positions.push(Vec3::ZERO);
        positions.push(Vec3::new(a.cos(), a.sin(), 1.0) * radius);
        positions.push(Vec3::new(b.cos(), b.sin(), 1.0) * radius);
        let base = i * 3;
        triangles.push(UVec3::new(base, base + 1, base + 2));
    }
    let n = positions.len();
    let mut primitive = Primitive {
        positions,
        normals: vec![Vec3::Z; n],
        texcoords0: vec![Vec2::ZERO; n],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); n],
        triangles,
        material: material_key,
        untextured: true,
    };
    for normal in &mut primitive.normals {
        *normal = -*normal;
    }

    let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
    let mut node = Node::new(Mat4::IDENTITY);
    node.mesh = Some(mesh);
    let node_key = model.nodes.insert(node);
    model.scenes.push(vec![node_key]);
    model
}

/// Scenario 3: 1x1 path-mode pass inside an enclosing emissive sphere —
/// the path hits the emissive surface on its first bounce.
#[test]
fn scenario_3_path_mode_hits_emissive_enclosure() {
    let model = enclosing_emissive_sphere_model();
    let camera = Camera::new(1, 1, 60.0);
    let mut image = ImageBuffer::new(1, 1);
    let params = RenderParams {
        mode: ShadingMode::PathTracing,
        samples: 1,
        max_samples: 1,
        depth_min: 5,
        depth_limit: 64,
        ..RenderParams::default()
    };
    let cancel = cancel_flag(false);

    let mut renderer = Renderer::new();
    renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();

    let c = image.radiance[0];
    assert!(c.x >= 0.0 && c.x <= 1.0 + 1e-4);
    assert!(c.x > 0.9 && c.y > 0.9 && c.z > 0.9, "expected ~(1,1,1), got {c:?}");
}

/// Scenario 4: rendering the same scene twice with the same parameters
/// byte-compares equal (determinism under the fixed per-tile RNG seeding).
#[test]
fn scenario_4_determinism_across_runs() {
    let model = enclosing_emissive_sphere_model();
    let camera = Camera::new(8, 8, 60.0);
    let params = RenderParams {
        mode: ShadingMode::PathTracing,
        samples: 4,
        max_samples: 4,
        depth_min: 5,
        depth_limit: 64,
        ..RenderParams::default()
    };

    let mut image_a = ImageBuffer::new(8, 8);
    let mut renderer_a = Renderer::new();
    renderer_a.render(&model, &camera, None, 0.0, &mut image_a, &params, &cancel_flag(false)).unwrap();

    let mut image_b = ImageBuffer::new(8, 8);
    let mut renderer_b = Renderer::new();
    renderer_b.render(&model, &camera, None, 0.0, &mut image_b, &params, &cancel_flag(false)).unwrap();

    assert_eq!(image_a.radiance, image_b.radiance);
    assert_eq!(image_a.ldr, image_b.ldr);
}

fn translating_node_model() -> (Model, rayforge_scene::AnimationKey) {
    let mut model = Model::new();
    let material = model.materials.insert(Material::default());
    let primitive = Primitive {
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        normals: vec![Vec3::Z; 3],
        texcoords0: vec![Vec2::ZERO; 3],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 3],
        triangles: vec![UVec3::new(0, 1, 2)],
        material,
        untextured: true,
    };
    let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
    let mut node = Node::new(Mat4::IDENTITY);
    node.mesh = Some(mesh);
    let node_key = model.nodes.insert(node);
    model.scenes.push(vec![node_key]);

    let sampler = AnimationSampler {
        timeline: vec![0.0, 1.0],
        values: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        interpolation: Interpolation::Linear,
    };
    let animation = Animation {
        name: None,
        samplers: vec![sampler],
        channels: vec![AnimationChannel { sampler: 0, target_node: node_key, target_path: TargetPath::Translation }],
        timeline_min: 0.0,
        timeline_max: 1.0,
    };
    let animation_key = model.animations.insert(animation);
    (model, animation_key)
}

/// Scenario 5: a single translation channel sampled at `t=0.5` shifts every
/// vertex's world position by `(0.5, 0, 0)` relative to `t=0`.
#[test]
fn scenario_5_animated_translation_shifts_geometry() {
    use rayforge_geometry::{generate_geometries, update_geometries};
    use rayforge_intersect::Intersector;

    let (model, animation_key) = translating_node_model();
    let animation = &model.animations[animation_key];

    let mut ix = Intersector::new();
    let mut geoms = generate_geometries(&model, &mut ix).unwrap();
    let mut state = rayforge::AnimationState::new(animation);
    update_geometries(&model, &mut geoms, &mut ix, Some(animation), &mut state, 0.0).unwrap();
    let p0 = ix.world_position(geoms[0].geom_id, 0, 0.0, 0.0).unwrap();

    let mut ix2 = Intersector::new();
    let mut geoms2 = generate_geometries(&model, &mut ix2).unwrap();
    let mut state2 = rayforge::AnimationState::new(animation);
    update_geometries(&model, &mut geoms2, &mut ix2, Some(animation), &mut state2, 0.5).unwrap();
    let p1 = ix2.world_position(geoms2[0].geom_id, 0, 0.0, 0.0).unwrap();

    assert!((p1 - p0 - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
}

/// Scenario 6: cancellation mid-pass leaves a bounded, finite accumulator
/// and reports a sample count no greater than requested.
#[test]
fn scenario_6_cancellation_bounds_sample_count() {
    let model = enclosing_emissive_sphere_model();
    let camera = Camera::new(4, 4, 60.0);
    let mut image = ImageBuffer::new(4, 4);
    let params = RenderParams {
        mode: ShadingMode::PathTracing,
        samples: 100,
        max_samples: 100,
        depth_min: 5,
        depth_limit: 64,
        ..RenderParams::default()
    };
    let cancel = cancel_flag(true);

    let mut renderer = Renderer::new();
    let status = renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel).unwrap();

    match status {
        RenderStatus::Cancelled { samples_so_far } => assert!(samples_so_far <= 100),
        RenderStatus::Completed { samples } => assert!(samples <= 100),
    }
    assert!(image.radiance.iter().all(|c| c.is_finite()));
}

#[test]
fn invalid_params_are_rejected_as_render_error() {
    let model = Model::new();
    let camera = Camera::new(1, 1, 60.0);
    let mut image = ImageBuffer::new(1, 1);
    let params = RenderParams { samples: 0, ..RenderParams::default() };
    let cancel = cancel_flag(false);

    let mut renderer = Renderer::new();
    let result = renderer.render(&model, &camera, None, 0.0, &mut image, &params, &cancel);
    assert!(matches!(result, Err(RenderError::InvalidInput(_))));
}
