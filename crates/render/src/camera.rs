use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Orbiting look-at camera producing the view-projection half of the mvp.
///
/// `fov` is the horizontal field of view in radians; the vertical extent
/// follows from `aspect` (width / height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// GL-style perspective: clip z in `[-w, w]`, `w` is view distance.
    pub fn projection_matrix(&self) -> Mat4 {
        let fov_y = 2.0 * ((self.fov * 0.5).tan() / self.aspect).atan();
        Mat4::perspective_rh_gl(fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate the eye around the target. Pitch stops short of the poles.
    pub fn orbit(&mut self, dyaw: f32, dpitch: f32) {
        let offset = self.eye - self.target;
        let radius = offset.length();
        if radius == 0.0 {
            return;
        }
        let yaw = offset.z.atan2(offset.x) + dyaw;
        let pitch = ((offset.y / radius).asin() + dpitch)
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
        self.eye = self.target
            + Vec3::new(
                yaw.cos() * pitch.cos(),
                pitch.sin(),
                yaw.sin() * pitch.cos(),
            ) * radius;
    }
}

/// 2D projection of the rectangle `(x0, y0)..(x1, y1)` onto NDC. Z passes through.
pub fn ortho(x0: f32, y0: f32, x1: f32, y1: f32) -> Mat4 {
    #[rustfmt::skip]
    let cols = [
        2.0 / (x1 - x0), 0.0, 0.0, 0.0,
        0.0, 2.0 / (y1 - y0), 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        -(x1 + x0) / (x1 - x0), -(y1 + y0) / (y1 - y0), 0.0, 1.0,
    ];
    Mat4::from_cols_array(&cols)
}
