//! Y-bucketed tables of edges and polygons.
//!
//! The vertical screen range `[-1, 1]` is cut into `N` equal bands; an edge
//! or polygon lives in the band of its minimal Y. Coordinates outside the
//! screen clamp to the first or last band. Bucket granularity only changes
//! how much work a query does, never its answer.

use super::{Edge, PreparedPolygon};
use crate::math::Vec3;

/// Maps Y coordinates to bucket levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YGrid {
    levels: usize,
}

impl YGrid {
    pub fn new(levels: usize) -> Self {
        Self {
            levels: levels.max(1),
        }
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Bucket index of `y`, clamped to the table.
    #[inline]
    pub fn level(&self, y: f64) -> usize {
        let scaled = ((y + 1.0) * 0.5 * self.levels as f64).floor();
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as usize).min(self.levels - 1)
        }
    }

    /// Lowest Y that maps to `level` (excluding clamped values).
    #[inline]
    pub fn floor_y(&self, level: usize) -> f64 {
        level as f64 / self.levels as f64 * 2.0 - 1.0
    }
}

/// Edges bucketed by their lower endpoint.
#[derive(Clone, Debug)]
pub struct EdgeHashTable {
    grid: YGrid,
    buckets: Vec<Vec<Edge>>,
    /// Highest `y_max` ever inserted per bucket. Never shrinks on removal.
    max_y: Vec<f64>,
    len: usize,
}

impl EdgeHashTable {
    pub fn new(levels: usize) -> Self {
        let grid = YGrid::new(levels);
        Self {
            grid,
            buckets: vec![Vec::new(); grid.levels()],
            max_y: vec![f64::NEG_INFINITY; grid.levels()],
            len: 0,
        }
    }

    pub fn from_edges(levels: usize, edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut table = Self::new(levels);
        for edge in edges {
            table.insert(edge);
        }
        table
    }

    pub fn grid(&self) -> YGrid {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, edge: Edge) {
        let level = self.grid.level(edge.y_min());
        self.max_y[level] = self.max_y[level].max(edge.y_max());
        self.buckets[level].push(edge);
        self.len += 1;
    }

    /// Inserts unless the same segment (either direction) is already present.
    ///
    /// Returns `false` for the dropped duplicate. An edge shared by two
    /// adjacent polygons is thus tested once.
    pub fn insert_unique(&mut self, edge: Edge) -> bool {
        let level = self.grid.level(edge.y_min());
        // Endpoints equal within epsilon may straddle a bucket boundary.
        let lo = level.saturating_sub(1);
        let hi = (level + 1).min(self.grid.levels() - 1);
        if self.buckets[lo..=hi]
            .iter()
            .flatten()
            .any(|other| other.same_segment(&edge))
        {
            return false;
        }
        self.insert(edge);
        true
    }

    pub fn bucket(&self, level: usize) -> &[Edge] {
        &self.buckets[level]
    }

    pub fn bucket_max_y(&self, level: usize) -> f64 {
        self.max_y[level]
    }

    /// Removes an edge by position; order inside the bucket is not kept.
    pub fn remove(&mut self, level: usize, index: usize) -> Edge {
        self.len -= 1;
        self.buckets[level].swap_remove(index)
    }

    /// Empties the table, returning its edges in increasing bucket order.
    pub fn drain_ordered(&mut self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.len);
        for bucket in &mut self.buckets {
            edges.append(bucket);
        }
        self.max_y.fill(f64::NEG_INFINITY);
        self.len = 0;
        edges
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.buckets.iter().flatten()
    }

    /// Lowest non-empty bucket.
    pub fn first_level(&self) -> Option<usize> {
        self.buckets.iter().position(|bucket| !bucket.is_empty())
    }

    pub fn total_length(&self) -> f64 {
        self.iter().map(Edge::length).sum()
    }
}

/// Occluding polygons bucketed by the bottom of their bounding box.
#[derive(Clone, Debug)]
pub struct PolygonHashTable {
    grid: YGrid,
    buckets: Vec<Vec<PreparedPolygon>>,
    /// Buckets below this one are known to be empty.
    first_live: usize,
    len: usize,
}

impl PolygonHashTable {
    pub fn new(levels: usize) -> Self {
        let grid = YGrid::new(levels);
        Self {
            grid,
            buckets: vec![Vec::new(); grid.levels()],
            first_live: 0,
            len: 0,
        }
    }

    pub fn grid(&self) -> YGrid {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, polygon: PreparedPolygon) {
        let level = self.grid.level(polygon.bbox.min.y);
        self.first_live = self.first_live.min(level);
        self.buckets[level].push(polygon);
        self.len += 1;
    }

    /// Polygons whose bounding-box Y range covers `p`.
    pub fn candidates(&self, p: Vec3) -> impl Iterator<Item = &PreparedPolygon> {
        let top = self.grid.level(p.y);
        let lo = self.first_live.min(top);
        self.buckets[lo..=top]
            .iter()
            .flatten()
            .filter(move |polygon| polygon.bbox.min.y <= p.y && polygon.bbox.max.y >= p.y)
    }

    /// First polygon hiding `p`, if any.
    pub fn occluder(&self, p: Vec3) -> Option<&PreparedPolygon> {
        self.candidates(p).find(|polygon| polygon.occludes(p))
    }

    /// Drops polygons lying entirely below `y`.
    ///
    /// Only valid while queries arrive in non-decreasing Y order.
    pub fn evict_below(&mut self, y: f64) {
        let top = self.grid.level(y).max(self.first_live);
        let mut evicted = 0;
        for bucket in &mut self.buckets[self.first_live..=top] {
            let before = bucket.len();
            bucket.retain(|polygon| polygon.bbox.max.y >= y);
            evicted += before - bucket.len();
        }
        self.len -= evicted;
        while self.first_live < self.grid.levels() - 1 && self.buckets[self.first_live].is_empty() {
            self.first_live += 1;
        }
    }
}
