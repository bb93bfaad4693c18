//! Emission: chaining fragments into polylines and writing them out.

mod path;
mod writer;

pub use path::{build_polylines, collinear, Polyline};
pub use writer::{format_real, write_matrix, write_polyline_set, PolylineSet};
