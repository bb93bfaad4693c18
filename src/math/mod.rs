//! Small linear-algebra kit used by every pipeline stage.
//!
//! All types are `f64`. Depth and crossing tests compare against fixed
//! epsilons around `1e-6`.

pub mod mat4;
pub mod vec2;
pub mod vec3;

pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
