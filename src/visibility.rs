//! Visibility classification of visibility-uniform fragments.
//!
//! A fragment is decided by its midpoint alone: pulled slightly toward the
//! viewer so the polygon owning the edge cannot hide it, then tested against
//! every polygon whose bounding box covers it. The first polygon that has the
//! point behind its plane and inside its outline hides the fragment.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::geometry::{Edge, EdgeHashTable, PolygonHashTable, VISIBILITY_Z_BIAS};
use crate::math::Vec3;

/// Fragments split by visibility, each re-bucketed by Y.
#[derive(Debug)]
pub struct Classified {
    pub visible: EdgeHashTable,
    pub hidden: EdgeHashTable,
}

/// Midpoint of `edge` nudged toward the viewer.
#[inline]
pub fn probe_point(edge: &Edge) -> Vec3 {
    let mut p = edge.midpoint();
    p.z -= VISIBILITY_Z_BIAS;
    p
}

/// Whether no polygon in `polygons` hides `edge`.
pub fn is_visible(edge: &Edge, polygons: &PolygonHashTable) -> bool {
    polygons.occluder(probe_point(edge)).is_none()
}

/// Splits `edges` into visible and hidden fragments.
///
/// The sequential path evicts polygons that fell below the sweep as it goes;
/// the parallel path (rayon) leaves the polygon table untouched.
pub fn classify(
    mut edges: EdgeHashTable,
    mut polygons: PolygonHashTable,
    parallel: bool,
    cancel: Option<&AtomicBool>,
) -> Result<Classified> {
    let levels = edges.grid().levels();
    let fragments = edges.drain_ordered();

    let flags = if parallel {
        classify_parallel(&fragments, &polygons, cancel)?
    } else {
        classify_sweep(&fragments, &mut polygons, cancel)?
    };

    let mut classified = Classified {
        visible: EdgeHashTable::new(levels),
        hidden: EdgeHashTable::new(levels),
    };
    for (edge, visible) in fragments.into_iter().zip(flags) {
        if visible {
            classified.visible.insert(edge);
        } else {
            classified.hidden.insert(edge);
        }
    }
    Ok(classified)
}

fn cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// `fragments` must be in increasing bucket order.
fn classify_sweep(
    fragments: &[Edge],
    polygons: &mut PolygonHashTable,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<bool>> {
    let grid = polygons.grid();
    let mut current_level = None;
    let mut flags = Vec::with_capacity(fragments.len());

    for edge in fragments {
        if cancelled(cancel) {
            return Err(Error::Cancelled);
        }
        let level = grid.level(edge.y_min());
        // Level 0 also holds everything clamped from below the screen.
        if current_level != Some(level) {
            if level > 0 {
                polygons.evict_below(grid.floor_y(level));
            }
            current_level = Some(level);
        }
        flags.push(is_visible(edge, polygons));
    }
    Ok(flags)
}

#[cfg(feature = "parallel")]
fn classify_parallel(
    fragments: &[Edge],
    polygons: &PolygonHashTable,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<bool>> {
    use rayon::prelude::*;

    fragments
        .par_iter()
        .map(|edge| {
            if cancelled(cancel) {
                None
            } else {
                Some(is_visible(edge, polygons))
            }
        })
        .collect::<Option<Vec<bool>>>()
        .ok_or(Error::Cancelled)
}

#[cfg(not(feature = "parallel"))]
fn classify_parallel(
    fragments: &[Edge],
    polygons: &PolygonHashTable,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<bool>> {
    log::debug!("built without the `parallel` feature, classifying sequentially");
    fragments
        .iter()
        .map(|edge| {
            if cancelled(cancel) {
                Err(Error::Cancelled)
            } else {
                Ok(is_visible(edge, polygons))
            }
        })
        .collect()
}
