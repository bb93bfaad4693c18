//! Placement of the viewer and of scene objects.
//!
//! A [`Transform`] accumulates scale, Euler rotation, and translation and
//! bakes them into the [`Mat4`] a [`Scene`](crate::Scene) uses as its view or
//! a [`SceneObject`](crate::SceneObject) as its local matrix.

use crate::math::{Mat4, Vec3};

/// Scale, then rotate about X, Y, Z, then translate.
///
/// ```
/// use hidlines::Transform;
///
/// let view = Transform::new()
///     .rotated(0.4, -0.6, 0.0)
///     .scaled(0.5)
///     .translated(0.0, 0.0, 3.0)
///     .to_matrix();
/// # let _ = view;
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    scale: Vec3,
    /// Radians about X, Y, Z, applied in that order.
    angles: Vec3,
    offset: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            angles: Vec3::ZERO,
            offset: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`Transform::rotated`], in degrees.
    pub fn rotated_degrees(self, x: f64, y: f64, z: f64) -> Self {
        self.rotated(x.to_radians(), y.to_radians(), z.to_radians())
    }

    /// Adds to the rotation angles (radians).
    pub fn rotated(mut self, x: f64, y: f64, z: f64) -> Self {
        self.angles = self.angles + Vec3::new(x, y, z);
        self
    }

    /// Multiplies the uniform scale.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.scale = self.scale * factor;
        self
    }

    /// Adds to the translation applied last.
    pub fn translated(mut self, x: f64, y: f64, z: f64) -> Self {
        self.offset = self.offset + Vec3::new(x, y, z);
        self
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.offset.x, self.offset.y, self.offset.z)
            * Mat4::rotation_z(self.angles.z)
            * Mat4::rotation_y(self.angles.y)
            * Mat4::rotation_x(self.angles.x)
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<Transform> for Mat4 {
    fn from(transform: Transform) -> Self {
        transform.to_matrix()
    }
}
