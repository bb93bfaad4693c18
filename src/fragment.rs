//! Edge fragmentation: cut edges where they pass behind other edges.
//!
//! Edges are re-inserted bottom-up. Each candidate is crossed against the
//! edges already placed in the Y window it can reach; whenever a crossing
//! leaves one edge farther than the other, the farther one is split there and
//! both pieces go back onto the worklist. The result is a table in which
//! every edge is visibility-uniform.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{Edge, EdgeHashTable, Intersection};
use crate::math::Vec3;

/// Splits every edge of `table` until no visibility change remains inside
/// an edge. Returns the new table and the number of splits performed.
pub fn fragment(table: EdgeHashTable, cancel: Option<&AtomicBool>) -> Result<(EdgeHashTable, usize)> {
    let mut fragmenter = Fragmenter::new(table);
    fragmenter.run(cancel)?;
    Ok((fragmenter.placed, fragmenter.splits))
}

/// Fragmentation state: the table being rebuilt and its Y window.
struct Fragmenter {
    pending: Vec<Edge>,
    placed: EdgeHashTable,
    /// Buckets below this one can no longer reach the current edge.
    min_level: usize,
    splits: usize,
}

/// Where a crossing was found.
enum Hit {
    Candidate(Vec3),
    Placed {
        level: usize,
        index: usize,
        at: Vec3,
    },
}

impl Fragmenter {
    fn new(mut table: EdgeHashTable) -> Self {
        let pending = table.drain_ordered();
        Self {
            pending,
            placed: table,
            min_level: 0,
            splits: 0,
        }
    }

    fn run(&mut self, cancel: Option<&AtomicBool>) -> Result<()> {
        let grid = self.placed.grid();
        let pending = std::mem::take(&mut self.pending);
        debug!("fragmenting {} edges", pending.len());

        let mut worklist = Vec::new();
        for edge in pending {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(Error::Cancelled);
            }

            // Top-level edges arrive in bucket order, so buckets whose edges
            // all end below this bucket's floor are out of reach for good.
            let level = grid.level(edge.y_min());
            let frontier = grid.floor_y(level);
            while self.min_level < level && self.placed.bucket_max_y(self.min_level) < frontier {
                self.min_level += 1;
            }

            worklist.push(edge);
            while let Some(edge) = worklist.pop() {
                self.place(edge, &mut worklist);
            }
        }
        Ok(())
    }

    /// Places `edge` or splits it (or a placed edge) and defers the pieces.
    fn place(&mut self, edge: Edge, worklist: &mut Vec<Edge>) {
        match self.find_hit(&edge) {
            None => self.placed.insert(edge),
            Some(Hit::Candidate(at)) => {
                self.splits += 1;
                worklist.extend(edge.split_at(at));
            }
            Some(Hit::Placed { level, index, at }) => {
                self.splits += 1;
                let other = self.placed.remove(level, index);
                worklist.extend(other.split_at(at));
                // Re-examined first: the remaining placed edges may still cut it.
                worklist.push(edge);
            }
        }
    }

    fn find_hit(&self, edge: &Edge) -> Option<Hit> {
        let grid = self.placed.grid();
        let top = grid.level(edge.y_max());
        if self.min_level > top {
            return None;
        }
        for level in self.min_level..=top {
            for (index, other) in self.placed.bucket(level).iter().enumerate() {
                match edge.intersect(other) {
                    Intersection::None => {}
                    Intersection::SplitFirst(at) => return Some(Hit::Candidate(at)),
                    Intersection::SplitSecond(at) => return Some(Hit::Placed { level, index, at }),
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn edge(a: (f64, f64, f64), b: (f64, f64, f64)) -> Edge {
        Edge::new(Vec3::new(a.0, a.1, a.2), Vec3::new(b.0, b.1, b.2), false)
    }

    fn grid_of_lines(levels: usize) -> EdgeHashTable {
        // Near horizontals over far verticals: each vertical is cut four times.
        let mut edges = Vec::new();
        for i in 0..4 {
            let c = -0.6 + 0.4 * i as f64;
            edges.push(edge((-0.9, c, 0.0), (0.9, c, 0.0)));
            edges.push(edge((c, -0.9, 1.0), (c, 0.9, 1.0)));
        }
        EdgeHashTable::from_edges(levels, edges)
    }

    #[test]
    fn far_edges_are_cut_at_every_crossing() {
        let (table, splits) = fragment(grid_of_lines(50), None).expect("not cancelled");
        assert_eq!(splits, 16);
        // 4 untouched horizontals + 4 verticals in 5 pieces each.
        assert_eq!(table.len(), 24);
        assert_eq!(table.iter().filter(|e| e.v[0].z == 0.0).count(), 4);
    }

    #[test]
    fn fragmentation_is_a_fixed_point() {
        let (once, _) = fragment(grid_of_lines(7), None).expect("not cancelled");
        let count = once.len();
        let length = once.total_length();
        let (twice, splits) = fragment(once, None).expect("not cancelled");
        assert_eq!(splits, 0);
        assert_eq!(twice.len(), count);
        assert_relative_eq!(twice.total_length(), length, epsilon = 1e-12);
    }

    #[test]
    fn length_is_conserved_for_any_bucket_count() {
        let before = grid_of_lines(1).total_length();
        for levels in [1, 3, 50, 500] {
            let (table, splits) = fragment(grid_of_lines(levels), None).expect("not cancelled");
            assert_eq!(splits, 16, "bucket count {levels} changed the result");
            assert_relative_eq!(table.total_length(), before, epsilon = 1e-9);
        }
    }

    #[test]
    fn placed_edge_is_split_when_candidate_is_in_front() {
        // The far edge sits in a lower bucket and is placed first.
        let far = edge((0.0, -0.9, 1.0), (0.0, 0.9, 1.0));
        let near = edge((-0.5, 0.0, 0.0), (0.5, 0.0, 0.0));
        let (table, splits) =
            fragment(EdgeHashTable::from_edges(10, [far, near]), None).expect("not cancelled");
        assert_eq!(splits, 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn cancellation_stops_the_run() {
        let flag = AtomicBool::new(true);
        assert!(matches!(fragment(grid_of_lines(10), Some(&flag)), Err(Error::Cancelled)));
    }
}
