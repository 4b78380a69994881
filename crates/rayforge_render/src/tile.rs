//! Tile partitioning and the work-stealing dispatch over tiles.

use glam::Vec3;
use rayon::prelude::*;

use rayforge_core::RngState;

use crate::params::TileSize;

/// A rectangular pixel range `[x0, x1) x [y0, y1)`, clipped to the image.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub index: u32,
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Tile {
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| (x, y)))
    }
}

/// Partitions a `width x height` image into tiles of `tile_size`, clipping
/// the last row/column of tiles to the image bounds. Tile
/// indices are assigned in row-major order and used to seed each tile's
/// independent RNG stream.
#[must_use]
pub fn partition(width: u32, height: u32, tile_size: TileSize) -> Vec<Tile> {
    let tiles_x = width.div_ceil(tile_size.x).max(1);
    let tiles_y = height.div_ceil(tile_size.y).max(1);
    let mut out = Vec::with_capacity((tiles_x * tiles_y) as usize);
    let mut index = 0;
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_size.x;
            let y0 = ty * tile_size.y;
            let x1 = (x0 + tile_size.x).min(width);
            let y1 = (y0 + tile_size.y).min(height);
            out.push(Tile { index, x0, y0, x1, y1 });
            index += 1;
        }
    }
    out
}

/// Lets disjoint tiles write into the same pixel plane concurrently.
/// Safety invariant: `partition` assigns every pixel to exactly one tile,
/// so two tiles never touch the same index.
struct SharedPlane(*mut Vec3, usize);

unsafe impl Send for SharedPlane {}
unsafe impl Sync for SharedPlane {}

impl SharedPlane {
    fn new(slice: &mut [Vec3]) -> Self {
        Self(slice.as_mut_ptr(), slice.len())
    }

    /// # Safety
    /// `idx` must be owned exclusively by the calling tile for the
    /// duration of this dispatch.
    unsafe fn add(&self, idx: usize, value: Vec3) {
        debug_assert!(idx < self.1);
        *self.0.add(idx) += value;
    }

    /// # Safety
    /// Same as [`Self::add`].
    unsafe fn write(&self, idx: usize, value: Vec3) {
        debug_assert!(idx < self.1);
        *self.0.add(idx) = value;
    }
}

/// Dispatches `per_pixel` across `tiles` in parallel via a work-stealing
/// thread pool. Each tile seeds its own [`RngState`] from its
/// index before iterating its pixels in row-major order. `per_pixel`
/// returns `(radiance_delta, normal_aov, albedo_aov)`; radiance
/// accumulates, the AOVs are overwritten (the last sample wins — AOVs are
/// a single-sample debug aid, not something path-traced samples average).
pub fn dispatch(
    tiles: &[Tile],
    width: u32,
    radiance: &mut [Vec3],
    normal_aov: &mut [Vec3],
    albedo_aov: &mut [Vec3],
    per_pixel: impl Fn(u32, u32, &mut RngState) -> (Vec3, Vec3, Vec3) + Sync,
) {
    let radiance_plane = SharedPlane::new(radiance);
    let normal_plane = SharedPlane::new(normal_aov);
    let albedo_plane = SharedPlane::new(albedo_aov);

    tiles.par_iter().for_each(|tile| {
        let mut rng = RngState::seed_from_tile(tile.index);
        for (x, y) in tile.pixels() {
            let idx = (y as usize) * (width as usize) + (x as usize);
            let (r, n, a) = per_pixel(x, y, &mut rng);
            // SAFETY: `tile` owns `idx` exclusively (see `partition`).
            unsafe {
                radiance_plane.add(idx, r);
                normal_plane.write(idx, n);
                albedo_plane.write(idx, a);
            }
        }
    });
}
