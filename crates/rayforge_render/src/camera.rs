//! Pinhole/thin-lens/equirectangular camera and primary-ray generation.

use glam::Vec3;
use rayforge_intersect::Ray;

/// Which family of primary rays `Camera::ray_for` produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Pinhole by default; a thin lens when `lens_radius > 0`.
    Pinhole,
    /// Maps the full image to directions covering the unit sphere.
    Equirectangular,
}

/// The render camera. `side`/`true_up`/`aspect` are derived from `dir`/`up`
/// rather than stored, so mutating `dir` or `up` between passes can never
/// leave them stale.
#[derive(Debug, Clone)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    pub fov: f32,
    pub tnear: f32,
    pub tfar: f32,
    pub origin: Vec3,
    pub dir: Vec3,
    pub up: Vec3,
    pub lens_radius: f32,
    pub focus_distance: f32,
    pub projection: Projection,
}

impl Camera {
    #[must_use]
    pub fn new(width: u32, height: u32, fov_degrees: f32) -> Self {
        Self {
            width,
            height,
            fov: fov_degrees,
            tnear: 1e-3,
            tfar: 1e6,
            origin: Vec3::ZERO,
            dir: -Vec3::Z,
            up: Vec3::Y,
            lens_radius: 0.0,
            focus_distance: 1.0,
            projection: Projection::Pinhole,
        }
    }

    #[must_use]
    pub fn side(&self) -> Vec3 {
        self.dir.cross(self.up).normalize_or_zero()
    }

    #[must_use]
    pub fn true_up(&self) -> Vec3 {
        self.side().cross(self.dir).normalize_or_zero()
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.origin = eye;
        self.dir = (target - eye).normalize_or_zero();
        self.up = up;
    }

    /// Orbits `origin` around `target` by `d_theta`/`d_phi` radians,
    /// keeping the distance fixed, then re-points `dir` at `target`. A
    /// small pure-math helper for an external camera controller to drive.
    pub fn orbit(&mut self, target: Vec3, d_theta: f32, d_phi: f32) {
        let offset = self.origin - target;
        let radius = offset.length();
        if radius < 1e-6 {
            return;
        }
        let mut theta = offset.z.atan2(offset.x) + d_theta;
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos() + d_phi;
        phi = phi.clamp(1e-3, std::f32::consts::PI - 1e-3);
        theta = theta.rem_euclid(std::f32::consts::TAU);

        let new_offset =
            Vec3::new(radius * phi.sin() * theta.cos(), radius * phi.cos(), radius * phi.sin() * theta.sin());
        self.origin = target + new_offset;
        self.dir = (target - self.origin).normalize_or_zero();
    }

    /// Moves `origin` along `dir` by `delta`, without changing `dir`.
    pub fn dolly(&mut self, delta: f32) {
        self.origin += self.dir * delta;
    }

    /// Generates the primary ray for normalized device coordinates
    /// `(x_ndc, y_ndc) ∈ [-1, 1]²`. `lens_u`/`lens_v` are uniform `[0, 1)`
    /// randoms the caller draws from the tile's `RngState`, consumed only
    /// when `lens_radius > 0`.
    #[must_use]
    pub fn ray_for(&self, x_ndc: f32, y_ndc: f32, lens_u: f32, lens_v: f32) -> Ray {
        match self.projection {
            Projection::Equirectangular => self.equirectangular_ray(x_ndc, y_ndc),
            Projection::Pinhole => self.pinhole_ray(x_ndc, y_ndc, lens_u, lens_v),
        }
    }

    fn equirectangular_ray(&self, x_ndc: f32, y_ndc: f32) -> Ray {
        let theta = std::f32::consts::PI * (2.0 * x_ndc);
        let phi = std::f32::consts::PI * y_ndc;
        let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        Ray::new(self.origin, dir.normalize_or_zero(), self.tnear, self.tfar)
    }

    fn pinhole_ray(&self, x_ndc: f32, y_ndc: f32, lens_u: f32, lens_v: f32) -> Ray {
        let scale = (self.fov.to_radians() * 0.5).tan();
        let side = self.side();
        let true_up = self.true_up();
        let dir_sample = (side * (scale * x_ndc) + true_up * (scale * y_ndc) + self.dir).normalize_or_zero();

        if self.lens_radius <= 0.0 {
            return Ray::new(self.origin, dir_sample, self.tnear, self.tfar);
        }

        let (dx, dy) = concentric_disk_sample(lens_u, lens_v);
        let disk_offset = side * (dx * self.lens_radius) + true_up * (dy * self.lens_radius);
        let denom = dir_sample.dot(self.dir);
        let focus_point = self.origin + dir_sample * (self.focus_distance / denom);
        let new_origin = self.origin + disk_offset;
        let new_dir = (focus_point - new_origin).normalize_or_zero();
        Ray::new(new_origin, new_dir, self.tnear, self.tfar)
    }
}

/// Shirley's concentric disk mapping: turns two uniform `[0, 1)` randoms
/// into a uniform sample on the unit disk, avoiding the area distortion a
/// naive polar mapping produces near the disk's center.
fn concentric_disk_sample(u1: f32, u2: f32) -> (f32, f32) {
    let (offset_x, offset_y) = (2.0 * u1 - 1.0, 2.0 * u2 - 1.0);
    if offset_x == 0.0 && offset_y == 0.0 {
        return (0.0, 0.0);
    }
    let (r, theta) = if offset_x.abs() > offset_y.abs() {
        (offset_x, std::f32::consts::FRAC_PI_4 * (offset_y / offset_x))
    } else {
        (offset_y, std::f32::consts::FRAC_PI_2 - std::f32::consts::FRAC_PI_4 * (offset_x / offset_y))
    };
    (r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_points_down_camera_dir_without_lens() {
        let cam = Camera::new(64, 64, 60.0);
        let ray = cam.ray_for(0.0, 0.0, 0.5, 0.5);
        assert!(ray.dir.distance(cam.dir) < 1e-5);
    }

    #[test]
    fn look_at_points_dir_toward_target() {
        let mut cam = Camera::new(64, 64, 60.0);
        cam.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        assert!(cam.dir.distance(Vec3::Z) < 1e-5);
    }

    #[test]
    fn side_and_true_up_stay_orthonormal() {
        let mut cam = Camera::new(64, 64, 60.0);
        cam.look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        let side = cam.side();
        let true_up = cam.true_up();
        assert!(side.dot(cam.dir).abs() < 1e-5);
        assert!(true_up.dot(cam.dir).abs() < 1e-5);
        assert!(side.dot(true_up).abs() < 1e-5);
    }

    #[test]
    fn orbit_preserves_distance_to_target() {
        let mut cam = Camera::new(64, 64, 60.0);
        let target = Vec3::ZERO;
        cam.look_at(Vec3::new(0.0, 0.0, -5.0), target, Vec3::Y);
        let before = cam.origin.distance(target);
        cam.orbit(target, 0.7, 0.2);
        let after = cam.origin.distance(target);
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn dolly_moves_origin_along_dir() {
        let mut cam = Camera::new(64, 64, 60.0);
        cam.look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let before = cam.origin;
        cam.dolly(1.0);
        assert!((cam.origin - (before + cam.dir)).length() < 1e-5);
    }

    #[test]
    fn concentric_disk_sample_stays_within_unit_disk() {
        for (u1, u2) in [(0.0, 0.0), (1.0, 1.0), (0.25, 0.75), (0.9, 0.1)] {
            let (x, y) = concentric_disk_sample(u1, u2);
            assert!(x * x + y * y <= 1.0 + 1e-5);
        }
    }
}
