//! Error types for the hidden-line pipeline.
//!
//! Only failures that stop a run live here. Recoverable input problems
//! (degenerate or non-convex polygons, a singular view matrix) are logged and
//! skipped by the stage that finds them.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The scene file could not be read or parsed.
    #[error("Load error: {0}")]
    Load(#[from] tobj::LoadError),

    /// Writing the output scene failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A coordinate reached the writer as NaN or infinity.
    #[error("Cannot format non-finite coordinate {value}")]
    NonFiniteCoordinate { value: f64 },

    /// The caller raised the cancellation flag.
    #[error("Hidden-line computation cancelled")]
    Cancelled,
}

/// Why a polygon could not produce a plane equation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneError {
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("polygon vertices are collinear or coincide")]
    Degenerate,
}
