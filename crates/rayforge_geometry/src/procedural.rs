//! Procedural mesh builders (sphere/cube/ground plane), supplementing the
//! neutral data model with the scene-construction helpers used to stand up
//! a demo scene without a glTF/OBJ loader.

use glam::{Mat4, UVec3, Vec2, Vec3};
use rayforge_scene::{MaterialKey, Mesh, MeshKey, Model, Node, NodeKey, Primitive};

use crate::tangent::ensure_attributes;

fn finish_primitive(material: MaterialKey, positions: Vec<Vec3>, texcoords0: Vec<Vec2>, triangles: Vec<UVec3>) -> Primitive {
    let mut primitive = Primitive {
        positions,
        normals: Vec::new(),
        texcoords0,
        tangents: Vec::new(),
        triangles,
        material,
        untextured: false,
    };
    ensure_attributes(&mut primitive);
    primitive
}

fn add_node_with_mesh(model: &mut Model, transform: Mat4, mesh: MeshKey) -> NodeKey {
    let mut node = Node::new(transform);
    node.mesh = Some(mesh);
    let node_key = model.nodes.insert(node);
    match model.scenes.get_mut(model.default_scene) {
        Some(scene) => scene.push(node_key),
        None => {
            model.scenes.push(vec![node_key]);
            model.default_scene = model.scenes.len() - 1;
        }
    }
    node_key
}

/// Adds a UV sphere of the given radius, tessellated into `segments`
/// longitude steps and `rings` latitude steps (each `>= 3`).
pub fn add_sphere(model: &mut Model, material: MaterialKey, transform: Mat4, radius: f32, segments: u32, rings: u32) -> NodeKey {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut positions = Vec::new();
    let mut texcoords0 = Vec::new();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            positions.push(dir * radius);
            texcoords0.push(Vec2::new(u, v));
        }
    }

    let stride = segments + 1;
    let mut triangles = Vec::new();
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            let c = a + 1;
            let d = b + 1;
            triangles.push(UVec3::new(a, b, c));
            triangles.push(UVec3::new(c, b, d));
        }
    }

    let primitive = finish_primitive(material, positions, texcoords0, triangles);
    let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
    add_node_with_mesh(model, transform, mesh)
}

/// Adds an axis-aligned cube with edge length `2 * half_extent`, 24
/// vertices (4 per face, so each face gets its own normals/texcoords).
pub fn add_cube(model: &mut Model, material: MaterialKey, transform: Mat4, half_extent: f32) -> NodeKey {
    let h = half_extent;
    let faces: [[Vec3; 4]; 6] = [
        [Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h)], // +Z
        [Vec3::new(h, -h, -h), Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h)], // -Z
        [Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h), Vec3::new(-h, h, -h)], // +Y
        [Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h)], // -Y
        [Vec3::new(h, -h, h), Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h)], // +X
        [Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h)], // -X
    ];

    let mut positions = Vec::new();
    let mut texcoords0 = Vec::new();
    let mut triangles = Vec::new();
    for face in &faces {
        let base = positions.len() as u32;
        positions.extend_from_slice(face);
        texcoords0.extend_from_slice(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)]);
        triangles.push(UVec3::new(base, base + 1, base + 2));
        triangles.push(UVec3::new(base, base + 2, base + 3));
    }

    let primitive = finish_primitive(material, positions, texcoords0, triangles);
    let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
    add_node_with_mesh(model, transform, mesh)
}

/// Adds a flat quad in the node's local XZ plane, normal `+Y`, spanning
/// `[-half_extent, half_extent]` on each axis.
pub fn add_ground_plane(model: &mut Model, material: MaterialKey, transform: Mat4, half_extent: f32) -> NodeKey {
    let h = half_extent;
    let positions = vec![
        Vec3::new(-h, 0.0, -h),
        Vec3::new(h, 0.0, -h),
        Vec3::new(h, 0.0, h),
        Vec3::new(-h, 0.0, h),
    ];
    let texcoords0 = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
    let triangles = vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)];

    let primitive = finish_primitive(material, positions, texcoords0, triangles);
    let mesh = model.meshes.insert(Mesh { primitives: vec![primitive] });
    add_node_with_mesh(model, transform, mesh)
}
