//! `generateGeometries` / `updateGeometries`.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use slotmap::Key;

use rayforge_animation::{evaluate, AnimatedTransform, AnimationState};
use rayforge_intersect::{AttributeSlot, GeomHandle, Intersector};
use rayforge_scene::{Animation, MaterialKey, MeshKey, Model, NodeKey, Primitive};

use crate::error::GeometryBuildError;

/// A live binding between a primitive and an attached intersector geometry.
/// `node_chain` runs root-to-owner so `update_geometries` can recompose the
/// world transform each frame without walking the scene graph from scratch.
pub struct Geometry {
    pub handle: GeomHandle,
    pub geom_id: u32,
    pub material: MaterialKey,
    mesh: MeshKey,
    primitive_index: usize,
    node_chain: Vec<NodeKey>,
}

fn compose_m_anim(overrides: Option<&AnimatedTransform>) -> Mat4 {
    let Some(ov) = overrides else { return Mat4::IDENTITY };
    let translation = ov.translation.unwrap_or(Vec3::ZERO);
    let rotation = ov.rotation.unwrap_or(Quat::IDENTITY);
    let scale = ov.scale.unwrap_or(Vec3::ONE);
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Writes `primitive`'s object-space buffers into `buffers`, transformed
/// by `transform`: positions by `transform`, normals by the
/// inverse-transpose (renormalized), texcoords unchanged, tangent `xyz` by
/// `transform` (renormalized), and bitangents per the formula
/// `normalize(inverse_transpose · ((normal × tangent.xyz) · tangent.w))`,
/// evaluated in object space before the inverse-transpose is applied.
fn transform_primitive_into(primitive: &Primitive, transform: Mat4, buffers: &mut rayforge_intersect::PrimitiveBuffers) {
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    buffers.positions.clear();
    buffers.positions.extend(primitive.positions.iter().map(|p| transform.transform_point3(*p)));

    buffers.triangles.clear();
    buffers.triangles.extend(primitive.triangles.iter().copied());

    let normals = buffers.attribute_mut(AttributeSlot::Normal);
    for (dst, n) in normals.iter_mut().zip(&primitive.normals) {
        let world_n = (normal_matrix * *n).normalize_or_zero();
        *dst = Vec4::new(world_n.x, world_n.y, world_n.z, 0.0);
    }

    let texcoords = buffers.attribute_mut(AttributeSlot::Texcoord0);
    for (dst, uv) in texcoords.iter_mut().zip(&primitive.texcoords0) {
        *dst = Vec4::new(uv.x, uv.y, 0.0, 0.0);
    }

    let tangents = buffers.attribute_mut(AttributeSlot::Tangent);
    for (dst, t) in tangents.iter_mut().zip(&primitive.tangents) {
        let world_t = transform.transform_vector3(t.truncate()).normalize_or_zero();
        *dst = Vec4::new(world_t.x, world_t.y, world_t.z, t.w);
    }

    let bitangents = buffers.attribute_mut(AttributeSlot::Bitangent);
    for (i, dst) in bitangents.iter_mut().enumerate() {
        let n = primitive.normals[i];
        let t = primitive.tangents[i];
        let object_bitangent = n.cross(t.truncate()) * t.w;
        let world_b = (normal_matrix * object_bitangent).normalize_or_zero();
        *dst = Vec4::new(world_b.x, world_b.y, world_b.z, 0.0);
    }
}

fn material_user_data(material: MaterialKey) -> u64 {
    material.data().as_ffi()
}

fn walk(
    model: &Model,
    node: NodeKey,
    parent_transform: Mat4,
    chain: &mut Vec<NodeKey>,
    intersector: &mut Intersector,
    out: &mut Vec<Geometry>,
) -> Result<(), GeometryBuildError> {
    chain.push(node);
    let n = &model.nodes[node];
    let transform = parent_transform * n.local_matrix;

    if let Some(mesh_key) = n.mesh {
        let mesh = &model.meshes[mesh_key];
        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            primitive.validate().map_err(GeometryBuildError::InvalidPrimitive)?;
            let handle = intersector.new_geometry(primitive.positions.len(), primitive.triangles.len());
            {
                let buffers = intersector.buffers_mut(handle).expect("just created");
                transform_primitive_into(primitive, transform, buffers);
            }
            intersector.set_user_data(handle, material_user_data(primitive.material));
            let geom_id = intersector.attach(handle)?;
            out.push(Geometry {
                handle,
                geom_id,
                material: primitive.material,
                mesh: mesh_key,
                primitive_index,
                node_chain: chain.clone(),
            });
        }
    }

    for &child in &n.children {
        walk(model, child, transform, chain, intersector, out)?;
    }
    chain.pop();
    Ok(())
}

/// Flattens the default scene's node forest into attached intersector
/// geometries. Commits the scene once, after every geometry
/// has been attached. Rejects a malformed primitive (buffer length
/// mismatch, out-of-range triangle index) before it ever reaches the
/// intersector.
pub fn generate_geometries(model: &Model, intersector: &mut Intersector) -> Result<Vec<Geometry>, GeometryBuildError> {
    let mut out = Vec::new();
    if let Some(roots) = model.default_scene_roots() {
        let mut chain = Vec::new();
        for &root in roots {
            walk(model, root, Mat4::IDENTITY, &mut chain, intersector, &mut out)?;
        }
    }
    intersector.commit_scene()?;
    Ok(out)
}

/// Recomputes every geometry's world-space buffers for time `t`. When
/// `animation` is `None`, every `M_anim` is the identity, so this reduces
/// to re-deriving the same static transforms `generate_geometries` used —
/// callers normally skip calling this at all in the static case.
pub fn update_geometries(
    model: &Model,
    geometries: &mut [Geometry],
    intersector: &mut Intersector,
    animation: Option<&Animation>,
    anim_state: &mut AnimationState,
    t: f32,
) -> Result<(), GeometryBuildError> {
    if let Some(anim) = animation {
        anim.validate().map_err(GeometryBuildError::InvalidAnimation)?;
        let t_prime = if anim.timeline_max > 0.0 { t.rem_euclid(anim.timeline_max) } else { 0.0 };
        evaluate(anim, t_prime, anim_state);
    }

    for geometry in geometries.iter() {
        let mut transform = Mat4::IDENTITY;
        for &node_key in &geometry.node_chain {
            let node = &model.nodes[node_key];
            // Bug fix: a node with no animation channel gets
            // M_anim = identity, not a duplicate of `node.local_matrix`.
            let m_anim = if animation.is_some() {
                compose_m_anim(anim_state.overrides().get(node_key))
            } else {
                Mat4::IDENTITY
            };
            transform = transform * m_anim * node.local_matrix;
        }

        let mesh = &model.meshes[geometry.mesh];
        let primitive = &mesh.primitives[geometry.primitive_index];
        let buffers = intersector.buffers_mut(geometry.handle).expect("geometry handle still live");
        transform_primitive_into(primitive, transform, buffers);
        intersector.update_buffer(geometry.handle);
    }

    intersector.commit_scene()
}
