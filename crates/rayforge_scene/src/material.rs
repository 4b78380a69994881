//! Material record.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::TextureKey;

/// Shading family a material belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    Reflection,
    Refraction,
}

/// PBR-lite material parameters plus texture references.
///
/// Invariants: all factors finite; `roughness_factor` and
/// `metalness_factor` in `[0, 1]`; emissive components `>= 0`.
/// `Serialize`/`Deserialize` round-trip every field bit-exactly for finite
/// inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<TextureKey>,
    pub normal_texture: Option<TextureKey>,
    pub roughness_factor: f32,
    pub metalness_factor: f32,
    pub metallic_roughness_texture: Option<TextureKey>,
    pub emissive_factor: Vec3,
    pub emissive_texture: Option<TextureKey>,
    pub kind: MaterialKind,
}

impl Material {
    #[must_use]
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_color_factor.is_finite() {
            return Err("base_color_factor must be finite".into());
        }
        if !(0.0..=1.0).contains(&self.roughness_factor) {
            return Err("roughness_factor must be in [0, 1]".into());
        }
        if !(0.0..=1.0).contains(&self.metalness_factor) {
            return Err("metalness_factor must be in [0, 1]".into());
        }
        if !self.emissive_factor.is_finite() || self.emissive_factor.min_element() < 0.0 {
            return Err("emissive_factor must be finite and non-negative".into());
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            normal_texture: None,
            roughness_factor: 0.5,
            metalness_factor: 0.5,
            metallic_roughness_texture: None,
            emissive_factor: Vec3::ZERO,
            emissive_texture: None,
            kind: MaterialKind::Reflection,
        }
    }
}
