//! MikkTSpace-style per-vertex tangent generation.

use glam::{Vec2, Vec3, Vec4};
use rayforge_scene::Primitive;

/// Ensures `primitive` has normals, texcoords and tangents for every
/// vertex, generating whatever is missing:
///
/// - No normals: face-weighted smoothed normals (sum of face normals at
///   shared vertices, then normalized).
/// - No texcoords: filled with `(0, 0)`, and `primitive.untextured` is set.
/// - Tangents are always (re)computed from the (possibly just-generated)
///   normals and texcoords, with handedness stored in `tangent.w`.
pub fn ensure_attributes(primitive: &mut Primitive) {
    let n = primitive.positions.len();

    if primitive.normals.len() != n {
        primitive.normals = smoothed_normals(&primitive.positions, &primitive.triangles);
    }

    if primitive.texcoords0.len() != n {
        primitive.texcoords0 = vec![Vec2::ZERO; n];
        primitive.untextured = true;
    }

    primitive.tangents = generate_tangents(
        &primitive.positions,
        &primitive.normals,
        &primitive.texcoords0,
        &primitive.triangles,
    );
}

fn smoothed_normals(positions: &[Vec3], triangles: &[glam::UVec3]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let (i0, i1, i2) = (tri.x as usize, tri.y as usize, tri.z as usize);
        let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
        let face_normal = (p1 - p0).cross(p2 - p0);
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

fn generate_tangents(
    positions: &[Vec3],
    normals: &[Vec3],
    texcoords: &[Vec2],
    triangles: &[glam::UVec3],
) -> Vec<Vec4> {
    let n = positions.len();
    let mut tangents = vec![Vec3::ZERO; n];
    let mut bitangents = vec![Vec3::ZERO; n];

    for tri in triangles {
        let (i0, i1, i2) = (tri.x as usize, tri.y as usize, tri.z as usize);
        let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);
        let (uv0, uv1, uv2) = (texcoords[i0], texcoords[i1], texcoords[i2]);

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let denom = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        if denom.abs() < 1e-12 {
            continue;
        }
        let f = 1.0 / denom;
        let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) * f;
        let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) * f;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
        }
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let normal = normals[i];
        // Gram-Schmidt orthogonalize against the vertex normal.
        let t = (tangents[i] - normal * normal.dot(tangents[i])).normalize_or_zero();
        let t = if t == Vec3::ZERO { arbitrary_tangent(normal) } else { t };
        let handedness = if normal.cross(t).dot(bitangents[i]) < 0.0 { -1.0 } else { 1.0 };
        out.push(Vec4::new(t.x, t.y, t.z, handedness));
    }
    out
}

fn arbitrary_tangent(normal: Vec3) -> Vec3 {
    let reference = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    reference.cross(normal).normalize_or_zero()
}
