use approx::AbsDiffEq;

use crate::geometry::{EdgeHashTable, COLLINEAR_EPS, POINT_EQ_EPS};
use crate::math::Vec3;

/// An open chain of connected points.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
}

impl Polyline {
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// `b` continues the straight run `a -> b` toward `c`.
///
/// Beyond a vanishing cross product of the two unit directions, `b` has to
/// lie between `a` and `c` in X and Y, which rules out a reversal.
pub fn collinear(a: Vec3, b: Vec3, c: Vec3) -> bool {
    let cross = (b - a).normalize().cross((c - b).normalize());
    let between = |lo: f64, mid: f64, hi: f64| {
        mid >= lo.min(hi) - POINT_EQ_EPS && mid <= lo.max(hi) + POINT_EQ_EPS
    };
    cross.x.abs() < COLLINEAR_EPS
        && cross.y.abs() < COLLINEAR_EPS
        && cross.z.abs() < COLLINEAR_EPS
        && between(a.x, b.x, c.x)
        && between(a.y, b.y, c.y)
}

/// Greedily chains the fragments of `edges` into as few polylines as it can.
///
/// A chain grows from its last point, preferring the fragment that continues
/// the last segment straight (the last point then moves instead of a new one
/// being added); when it cannot grow it is reversed and grown from the other
/// end. Chains stop at `max_len` points.
pub fn build_polylines(mut edges: EdgeHashTable, max_len: usize) -> Vec<Polyline> {
    let max_len = max_len.max(2);
    let levels = edges.grid().levels();
    let mut polylines = Vec::new();
    let mut level = 0;

    loop {
        while level < levels && edges.bucket(level).is_empty() {
            level += 1;
        }
        if level == levels {
            break;
        }

        let seed = edges.remove(level, 0);
        let mut points = vec![seed.v[0], seed.v[1]];
        extend_chain(&mut edges, &mut points, max_len);
        points.reverse();
        extend_chain(&mut edges, &mut points, max_len);
        polylines.push(Polyline { points });
    }
    polylines
}

fn extend_chain(edges: &mut EdgeHashTable, points: &mut Vec<Vec3>, max_len: usize) {
    let grid = edges.grid();
    while points.len() < max_len {
        let last = points[points.len() - 1];
        let prev = points[points.len() - 2];
        let top = grid.level(last.y + POINT_EQ_EPS);

        let mut straight = None;
        let mut turn = None;
        'search: for level in 0..=top {
            if edges.bucket_max_y(level) < last.y - POINT_EQ_EPS {
                continue;
            }
            for (index, edge) in edges.bucket(level).iter().enumerate() {
                let Some(end) = edge.endpoint_at(last) else {
                    continue;
                };
                let far = edge.v[1 - end];
                if collinear(prev, last, far) {
                    straight = Some((level, index, far));
                    break 'search;
                }
                turn.get_or_insert((level, index, far));
            }
        }

        match (straight, turn) {
            (Some((level, index, far)), _) => {
                edges.remove(level, index);
                if let Some(tail) = points.last_mut() {
                    *tail = far;
                }
            }
            (None, Some((level, index, far))) => {
                edges.remove(level, index);
                if !far.abs_diff_eq(&last, POINT_EQ_EPS) {
                    points.push(far);
                }
            }
            (None, None) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Edge;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    fn table(segments: &[(Vec3, Vec3)]) -> EdgeHashTable {
        EdgeHashTable::from_edges(32, segments.iter().map(|&(a, b)| Edge::new(a, b, false)))
    }

    #[test]
    fn collinear_rejects_turns_and_reversals() {
        assert!(collinear(p(0.0, 0.0), p(0.5, 0.5), p(1.0, 1.0)));
        assert!(collinear(p(0.2, -1.0), p(0.2, 0.0), p(0.2, 0.7)));
        assert!(!collinear(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5)));
        assert!(!collinear(p(0.0, 0.0), p(1.0, 0.0), p(0.5, 0.0)));
    }

    #[test]
    fn straight_fragments_merge_into_one_segment() {
        // All three share one bucket; the middle one is first and seeds the chain.
        let edges = table(&[
            (p(-0.2, 0.1), p(0.2, 0.1)),
            (p(0.2, 0.1), p(0.6, 0.1)),
            (p(-0.6, 0.1), p(-0.2, 0.1)),
        ]);
        let polylines = build_polylines(edges, 100);
        assert_eq!(polylines.len(), 1);
        let points = &polylines[0].points;
        assert_eq!(points.len(), 2);
        assert_relative_eq!(polylines[0].length(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn closed_square_becomes_one_loop() {
        let corners = [p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5), p(0.0, 0.5)];
        let edges = table(&[
            (corners[0], corners[1]),
            (corners[1], corners[2]),
            (corners[2], corners[3]),
            (corners[3], corners[0]),
        ]);
        let polylines = build_polylines(edges, 100);
        assert_eq!(polylines.len(), 1);
        let points = &polylines[0].points;
        assert_eq!(points.len(), 5);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn straight_continuation_wins_over_a_turn() {
        // At (0, 0) the chain may turn up or continue right.
        let edges = table(&[
            (p(-0.5, 0.0), p(0.0, 0.0)),
            (p(0.0, 0.0), p(0.0, 0.5)),
            (p(0.0, 0.0), p(0.5, 0.0)),
        ]);
        let polylines = build_polylines(edges, 100);
        assert_eq!(polylines.len(), 2);
        let long = polylines
            .iter()
            .find(|line| line.points.len() == 2 && line.length() > 0.9)
            .expect("the horizontal run is one segment");
        assert_relative_eq!(long.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn chains_respect_the_length_cap() {
        let zigzag: Vec<(Vec3, Vec3)> = (0..6)
            .map(|i| {
                let x = i as f64 * 0.1;
                let y = |k: i32| if k % 2 == 0 { 0.0 } else { 0.1 };
                (p(x, y(i)), p(x + 0.1, y(i + 1)))
            })
            .collect();
        let polylines = build_polylines(table(&zigzag), 4);
        assert!(polylines.iter().all(|line| line.points.len() <= 4));
        let segments: usize = polylines.iter().map(|line| line.points.len() - 1).sum();
        assert_eq!(segments, 6);
    }
}
