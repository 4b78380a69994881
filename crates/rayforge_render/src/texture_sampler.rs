//! 2D texture fetch with wrap modes and optional bilinear filtering.

use glam::Vec4;
use rayforge_scene::{Texture, WrapMode};

fn wrap(mode: WrapMode, coord: i64, size: u32) -> u32 {
    let size = size as i64;
    match mode {
        WrapMode::Repeat => coord.rem_euclid(size) as u32,
        WrapMode::ClampToEdge => coord.clamp(0, size - 1) as u32,
        WrapMode::Mirror => {
            let period = 2 * size;
            let m = coord.rem_euclid(period);
            (if m < size { m } else { period - 1 - m }) as u32
        }
    }
}

fn texel_wrapped(tex: &Texture, x: i64, y: i64) -> Vec4 {
    let px = wrap(tex.wrap_s(), x, tex.width());
    let py = wrap(tex.wrap_t(), y, tex.height());
    tex.texel(px, py)
}

/// Samples `tex` at `uv`, applying `tex`'s wrap modes. The glTF Y-flip
/// convention (`v' = 1 - v`) is the loader's responsibility, so
/// this function consumes `uv` as-is.
///
/// `bilinear = false` rounds to the nearest texel; `true` performs
/// bilinear interpolation across the four neighboring texels.
#[must_use]
pub fn sample(tex: &Texture, uv: glam::Vec2, bilinear: bool) -> Vec4 {
    let fx = uv.x * tex.width() as f32 - 0.5;
    let fy = uv.y * tex.height() as f32 - 0.5;

    if !bilinear {
        let x = fx.round() as i64;
        let y = fy.round() as i64;
        return texel_wrapped(tex, x, y);
    }

    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let c00 = texel_wrapped(tex, x0, y0);
    let c10 = texel_wrapped(tex, x0 + 1, y0);
    let c01 = texel_wrapped(tex, x0, y0 + 1);
    let c11 = texel_wrapped(tex, x0 + 1, y0 + 1);

    let top = c00.lerp(c10, tx);
    let bottom = c01.lerp(c11, tx);
    top.lerp(bottom, ty)
}

/// The engine treats an absent texture as the multiplicative identity
///: opaque white.
#[must_use]
pub fn sample_optional(tex: Option<&Texture>, uv: glam::Vec2, bilinear: bool) -> Vec4 {
    match tex {
        Some(tex) => sample(tex, uv, bilinear),
        None => Vec4::ONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn checker() -> Texture {
        let px = vec![
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
        ];
        Texture::new(2, 2, px, WrapMode::Repeat, WrapMode::Repeat)
    }

    #[test]
    fn missing_texture_samples_as_white() {
        let v = sample_optional(None, Vec2::new(0.5, 0.5), true);
        assert_eq!(v, Vec4::ONE);
    }

    #[test]
    fn repeat_wrap_matches_in_bounds_texel() {
        let tex = checker();
        let a = sample(&tex, Vec2::new(0.25, 0.25), false);
        let b = sample(&tex, Vec2::new(1.25, 1.25), false);
        assert_eq!(a, b);
    }

    #[test]
    fn bilinear_blends_between_neighbors() {
        let tex = checker();
        let nearest = sample(&tex, Vec2::new(0.25, 0.25), false);
        let smooth = sample(&tex, Vec2::new(0.5, 0.5), true);
        assert_ne!(nearest, smooth);
    }
}
