//! `Primitive` and `Mesh`.

use glam::{UVec3, Vec2, Vec3, Vec4};

use crate::MaterialKey;

/// The renderable unit: object-space vertex buffers plus a triangle list
/// and a material reference.
///
/// Invariants: `normals`, `texcoords0` and `tangents` all have the
/// same length as `positions`; every index in `triangles` is `< positions.len()`;
/// winding follows the right-hand rule.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords0: Vec<Vec2>,
    /// `w` holds the MikkTSpace handedness sign.
    pub tangents: Vec<Vec4>,
    pub triangles: Vec<UVec3>,
    pub material: MaterialKey,
    /// Set by the tangent generator when no source texcoords were present
    ///; the shading kernel treats such a primitive's base-color
    /// texture as absent regardless of material assignment.
    pub untextured: bool,
}

impl Primitive {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Validates the structural invariants a primitive must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.positions.len();
        if self.normals.len() != n || self.texcoords0.len() != n || self.tangents.len() != n {
            return Err(format!(
                "primitive buffer length mismatch: positions={n} normals={} texcoords0={} tangents={}",
                self.normals.len(),
                self.texcoords0.len(),
                self.tangents.len()
            ));
        }
        for tri in &self.triangles {
            if tri.x as usize >= n || tri.y as usize >= n || tri.z as usize >= n {
                return Err(format!("triangle index out of bounds: {tri:?} (vertex count {n})"));
            }
        }
        Ok(())
    }
}

/// An ordered list of primitives.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn dummy_material_key() -> MaterialKey {
        let mut sm: SlotMap<MaterialKey, ()> = SlotMap::with_key();
        sm.insert(())
    }

    #[test]
    fn rejects_index_out_of_range() {
        let p = Primitive {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            texcoords0: vec![Vec2::ZERO; 3],
            tangents: vec![Vec4::X; 3],
            triangles: vec![UVec3::new(0, 1, 3)],
            material: dummy_material_key(),
            untextured: false,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn accepts_well_formed_triangle() {
        let p = Primitive {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            texcoords0: vec![Vec2::ZERO; 3],
            tangents: vec![Vec4::X; 3],
            triangles: vec![UVec3::new(0, 1, 2)],
            material: dummy_material_key(),
            untextured: false,
        };
        assert!(p.validate().is_ok());
    }
}
