//! Radiance accumulation buffer, AOVs, and the tone/gamma post-pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{U8Vec3, Vec3};

/// ACES (Narkowicz) filmic tone map: the fixed rational curve that maps
/// unbounded HDR radiance into `[0, 1]`.
fn aces_narkowicz(x: f32) -> f32 {
    (x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)
}

fn tone_map(c: Vec3) -> Vec3 {
    Vec3::new(aces_narkowicz(c.x), aces_narkowicz(c.y), aces_narkowicz(c.z))
}

fn linear_to_gamma(c: Vec3) -> Vec3 {
    Vec3::new(c.x.max(0.0).sqrt(), c.y.max(0.0).sqrt(), c.z.max(0.0).sqrt())
}

fn quantize(c: Vec3) -> U8Vec3 {
    let clamped = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    U8Vec3::new(clamped.x as u8, clamped.y as u8, clamped.z as u8)
}

/// `size.0 * size.1`-length radiance/AOV/LDR planes. Every array
/// has the same length; `reset` zeros all four in one call so a model
/// switch or a resize can't leave a stale AOV visible alongside fresh
/// radiance.
///
/// `non_finite_samples` counts every NaN/Inf radiance sample scrubbed by
/// `sanitize_counted` since the last `reset` — a diagnostic, not a panic:
/// the affected sample is replaced with `0` and rendering continues.
#[derive(Debug)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pub radiance: Vec<Vec3>,
    pub normal_aov: Vec<Vec3>,
    pub albedo_aov: Vec<Vec3>,
    pub ldr: Vec<U8Vec3>,
    pub non_finite_samples: AtomicU64,
}

impl Clone for ImageBuffer {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            radiance: self.radiance.clone(),
            normal_aov: self.normal_aov.clone(),
            albedo_aov: self.albedo_aov.clone(),
            ldr: self.ldr.clone(),
            non_finite_samples: AtomicU64::new(self.non_finite_samples.load(Ordering::Relaxed)),
        }
    }
}

impl ImageBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            radiance: vec![Vec3::ZERO; n],
            normal_aov: vec![Vec3::ZERO; n],
            albedo_aov: vec![Vec3::ZERO; n],
            ldr: vec![U8Vec3::ZERO; n],
            non_finite_samples: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn reset(&mut self) {
        self.radiance.fill(Vec3::ZERO);
        self.normal_aov.fill(Vec3::ZERO);
        self.albedo_aov.fill(Vec3::ZERO);
        self.ldr.fill(U8Vec3::ZERO);
        self.non_finite_samples.store(0, Ordering::Relaxed);
    }

    /// Quantizes `radiance` into `ldr`. `filtered = true`
    /// applies ACES tone mapping + gamma before the `[0, 1]` clamp and
    /// 8-bit quantization; `filtered = false` clamps the raw radiance
    /// directly. Idempotent for a fixed `radiance` buffer.
    pub fn update_ldr(&mut self, filtered: bool) {
        let counter = &self.non_finite_samples;
        for (dst, &radiance) in self.ldr.iter_mut().zip(&self.radiance) {
            let safe = sanitize_counted(radiance, counter);
            let c = if filtered { tone_map(linear_to_gamma(safe)) } else { safe.clamp(Vec3::ZERO, Vec3::ONE) };
            *dst = quantize(c);
        }
    }
}

/// Replaces non-finite components with `0`.
#[must_use]
pub fn sanitize(c: Vec3) -> Vec3 {
    Vec3::new(
        if c.x.is_finite() { c.x } else { 0.0 },
        if c.y.is_finite() { c.y } else { 0.0 },
        if c.z.is_finite() { c.z } else { 0.0 },
    )
}

/// Like [`sanitize`], but bumps `counter` once per call that actually
/// scrubbed a non-finite component — the diagnostic counter backing a
/// numerical failure report.
#[must_use]
pub fn sanitize_counted(c: Vec3, counter: &AtomicU64) -> Vec3 {
    if c.is_finite() {
        c
    } else {
        counter.fetch_add(1, Ordering::Relaxed);
        sanitize(c)
    }
}
