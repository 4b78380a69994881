//! Immutable 2D texture.

use glam::Vec4;

/// Wrap behavior for a texture coordinate outside `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
    Mirror,
}

/// An immutable 2D image of linear, unpremultiplied RGBA floats.
///
/// Invariant: `pixels.len() == width * height`.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
}

impl Texture {
    /// Builds a texture from a row-major pixel buffer.
    ///
    /// # Panics
    /// Panics if `pixels.len() != width * height` — this is an internal
    /// invariant the loader must uphold before handing a `Model` to the
    /// renderer.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<Vec4>, wrap_s: WrapMode, wrap_t: WrapMode) -> Self {
        assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "Texture pixel buffer length must equal width * height"
        );
        Self { width, height, pixels, wrap_s, wrap_t }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn wrap_s(&self) -> WrapMode {
        self.wrap_s
    }

    #[must_use]
    pub fn wrap_t(&self) -> WrapMode {
        self.wrap_t
    }

    #[must_use]
    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Fetches a texel by integer coordinate, with no wrapping or filtering.
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_lookup_is_row_major() {
        let px = vec![
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
        ];
        let tex = Texture::new(2, 2, px, WrapMode::Repeat, WrapMode::Repeat);
        assert_eq!(tex.texel(1, 0), Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(tex.texel(0, 1), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    #[should_panic]
    fn mismatched_buffer_len_panics() {
        let _ = Texture::new(2, 2, vec![Vec4::ONE; 3], WrapMode::Repeat, WrapMode::Repeat);
    }
}
