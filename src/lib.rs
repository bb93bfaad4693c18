//! Object-space hidden-line removal for polygonal scenes.
//!
//! The pipeline takes a [`Scene`] of convex planar polygons and polylines,
//! transforms it into view space, splits every edge wherever it passes behind
//! another one, keeps the fragments no polygon hides, and chains them back
//! into as few polylines as possible.
//!
//! View space is left-handed: X to the right, Y up, and Z pointing into the
//! screen, so a larger Z is farther from the viewer. On-screen geometry lives
//! in `[-1, 1] x [-1, 1]`.
//!
//! # Quick Start
//!
//! ```
//! use hidlines::prelude::*;
//!
//! let front = Poly::polygon([
//!     Vec3::new(-0.5, -0.5, 0.0),
//!     Vec3::new(0.5, -0.5, 0.0),
//!     Vec3::new(0.5, 0.5, 0.0),
//!     Vec3::new(-0.5, 0.5, 0.0),
//! ]);
//! let back = Poly::polygon([
//!     Vec3::new(0.0, 0.0, 1.0),
//!     Vec3::new(1.0, 0.0, 1.0),
//!     Vec3::new(1.0, 1.0, 1.0),
//!     Vec3::new(0.0, 1.0, 1.0),
//! ]);
//! let scene = Scene::default().with_object(SceneObject::new("squares").with_poly(front).with_poly(back));
//!
//! let output = Engine::new(HiddenLineConfig::default()).run(&scene)?;
//! assert!((output.visible.total_length() - 7.0).abs() < 1e-9);
//! # Ok::<(), hidlines::Error>(())
//! ```

pub mod config;
pub mod emit;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod geometry;
pub mod math;
pub mod prepare;
pub mod projection;
pub mod scene;
pub mod transform;
pub mod visibility;

pub use config::HiddenLineConfig;
pub use emit::{Polyline, PolylineSet};
pub use engine::{Engine, HiddenLineOutput, PipelineStats};
pub use error::{Error, Result};
pub use projection::Projection;
pub use scene::{Attributes, LineColor, Poly, PolyKind, Scene, SceneObject, Vertex};
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use hidlines::prelude::*;
/// ```
pub mod prelude {
    // Pipeline
    pub use crate::config::HiddenLineConfig;
    pub use crate::engine::{Engine, HiddenLineOutput};
    pub use crate::error::{Error, Result};

    // Scene
    pub use crate::scene::{Attributes, LineColor, Poly, Scene, SceneObject, Vertex};

    // View
    pub use crate::projection::Projection;
    pub use crate::transform::Transform;

    // Math
    pub use crate::math::{Mat4, Vec2, Vec3};
}
