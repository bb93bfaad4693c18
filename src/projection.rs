//! Optional perspective stage, applied after the view matrix and echoed
//! into the output as a `PRSP_MAT` record.

use crate::math::Mat4;

/// Symmetric frustum that becomes the scene's perspective matrix.
///
/// Depth after projection runs from -1 at `z_near` to +1 at `z_far`, so the
/// larger-Z-is-farther rule of view space still holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    fov_y: f64,
    aspect_ratio: f64,
    z_near: f64,
    z_far: f64,
}

impl Projection {
    /// `fov_y` in radians; `0 < z_near < z_far`.
    pub fn new(fov_y: f64, aspect_ratio: f64, z_near: f64, z_far: f64) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    pub fn from_degrees(fov_y_degrees: f64, aspect_ratio: f64, z_near: f64, z_far: f64) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    pub fn fov_y(&self) -> f64 {
        self.fov_y
    }

    /// Horizontal field of view in radians, derived from the vertical one.
    pub fn fov_x(&self) -> f64 {
        2.0 * (self.aspect_ratio * (self.fov_y / 2.0).tan()).atan()
    }

    pub fn z_near(&self) -> f64 {
        self.z_near
    }

    pub fn z_far(&self) -> f64 {
        self.z_far
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }
}
