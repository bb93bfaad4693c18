//! Geometric building blocks shared by the pipeline stages.
//!
//! Everything here works in view space (see the crate docs for the axis
//! convention): screen X/Y in `[-1, 1]` for on-screen geometry and Z growing
//! away from the viewer.

mod edge;
mod hash;
mod plane;
mod polygon;

pub use edge::{Edge, Intersection};
pub use hash::{EdgeHashTable, PolygonHashTable, YGrid};
pub use plane::{BBox, Plane};
pub use polygon::PreparedPolygon;

/// Two coordinates closer than this are the same vertex.
pub const POINT_EQ_EPS: f64 = 1e-8;

/// Smallest cross-product magnitude accepted when fitting a plane.
pub const PLANE_FIT_EPS: f64 = 1e-10;

/// Crossing parameters within this of 0 or 1 count as endpoint hits.
pub const INTERSECT_PARAM_EPS: f64 = 1e-6;

/// Relative determinant below which two edges are treated as parallel.
pub const PARALLEL_EPS: f64 = 1e-10;

/// How far a fragment midpoint is pulled toward the viewer before testing.
pub const VISIBILITY_Z_BIAS: f64 = 1e-5;

/// A point must sit this far behind a plane before the polygon may hide it.
pub const PLANE_EPS: f64 = 1e-6;

/// Half-plane slack of the convex containment test.
pub const INSIDE_EPS: f64 = 1e-10;

/// Cross-product slack when deciding two directions are collinear.
pub const COLLINEAR_EPS: f64 = 1e-6;
