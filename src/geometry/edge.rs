use approx::AbsDiffEq;

use super::{INTERSECT_PARAM_EPS, PARALLEL_EPS, POINT_EQ_EPS};
use crate::math::Vec3;

/// A straight segment in view space, stored with `v[0].y <= v[1].y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub v: [Vec3; 2],
    /// Produced by polygon decomposition rather than authored.
    pub internal: bool,
}

/// Outcome of crossing one edge with another in the XY projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    /// No crossing that changes visibility.
    None,
    /// Split the first edge at the given point; it is behind the second.
    SplitFirst(Vec3),
    /// Split the second edge at the given point; it is behind the first.
    SplitSecond(Vec3),
}

impl Edge {
    /// Builds an edge with its endpoints ordered by Y.
    pub fn new(a: Vec3, b: Vec3, internal: bool) -> Self {
        let v = if b.y < a.y { [b, a] } else { [a, b] };
        Self { v, internal }
    }

    #[inline]
    pub fn y_min(&self) -> f64 {
        self.v[0].y
    }

    #[inline]
    pub fn y_max(&self) -> f64 {
        self.v[1].y
    }

    pub fn midpoint(&self) -> Vec3 {
        self.v[0].lerp(self.v[1], 0.5)
    }

    pub fn length(&self) -> f64 {
        self.v[0].distance(self.v[1])
    }

    pub fn is_degenerate(&self) -> bool {
        self.v[0].abs_diff_eq(&self.v[1], POINT_EQ_EPS)
    }

    /// Same two endpoints, in either order.
    pub fn same_segment(&self, other: &Edge) -> bool {
        let [a, b] = self.v;
        let [c, d] = other.v;
        (a.abs_diff_eq(&c, POINT_EQ_EPS) && b.abs_diff_eq(&d, POINT_EQ_EPS))
            || (a.abs_diff_eq(&d, POINT_EQ_EPS) && b.abs_diff_eq(&c, POINT_EQ_EPS))
    }

    /// Endpoint index within [`POINT_EQ_EPS`] of `p`, if any.
    pub fn endpoint_at(&self, p: Vec3) -> Option<usize> {
        self.v.iter().position(|v| v.abs_diff_eq(&p, POINT_EQ_EPS))
    }

    /// Both halves of the edge cut at `p`, which must lie on it.
    pub fn split_at(&self, p: Vec3) -> [Edge; 2] {
        [
            Edge::new(self.v[0], p, self.internal),
            Edge::new(p, self.v[1], self.internal),
        ]
    }

    /// Axis-aligned XY boxes of the two edges overlap.
    fn xy_boxes_overlap(&self, other: &Edge) -> bool {
        let (min_x, max_x) = min_max(self.v[0].x, self.v[1].x);
        let (o_min_x, o_max_x) = min_max(other.v[0].x, other.v[1].x);
        max_x >= o_min_x - POINT_EQ_EPS
            && o_max_x >= min_x - POINT_EQ_EPS
            && self.y_max() >= other.y_min() - POINT_EQ_EPS
            && other.y_max() >= self.y_min() - POINT_EQ_EPS
    }

    /// Crosses `self` with `other` in XY and decides which edge, if any,
    /// must be cut so that both become visibility-uniform.
    ///
    /// Only the edge that is farther (larger interpolated Z) at the crossing
    /// is split, and only where the crossing is interior to it. A crossing at
    /// one edge's endpoint can therefore split only the other edge. Parallel
    /// edges never split. The depth comparison is a plain `>` on interpolated
    /// Z, which is approximate for near-tangential crossings.
    pub fn intersect(&self, other: &Edge) -> Intersection {
        if !self.xy_boxes_overlap(other) {
            return Intersection::None;
        }

        let da = self.v[1].xy() - self.v[0].xy();
        let db = other.v[1].xy() - other.v[0].xy();
        let det = db.cross(da);
        if det.abs() <= PARALLEL_EPS * da.length() * db.length() {
            return Intersection::None;
        }

        let r = other.v[0].xy() - self.v[0].xy();
        let t1 = db.cross(r) / det;
        let t2 = da.cross(r) / det;

        let in_range = |t: f64| (-INTERSECT_PARAM_EPS..=1.0 + INTERSECT_PARAM_EPS).contains(&t);
        if !in_range(t1) || !in_range(t2) {
            return Intersection::None;
        }

        let interior = |t: f64| t > INTERSECT_PARAM_EPS && t < 1.0 - INTERSECT_PARAM_EPS;
        let p1 = self.v[0].lerp(self.v[1], t1);
        let p2 = other.v[0].lerp(other.v[1], t2);

        if interior(t1) && p1.z > p2.z {
            Intersection::SplitFirst(p1)
        } else if interior(t2) && p2.z > p1.z {
            Intersection::SplitSecond(p2)
        } else {
            Intersection::None
        }
    }
}

#[inline]
fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn edge(a: (f64, f64, f64), b: (f64, f64, f64)) -> Edge {
        Edge::new(Vec3::new(a.0, a.1, a.2), Vec3::new(b.0, b.1, b.2), false)
    }

    #[test]
    fn endpoints_are_ordered_by_y() {
        let e = edge((0.0, 1.0, 0.0), (0.0, -1.0, 0.0));
        assert_eq!(e.y_min(), -1.0);
        assert_eq!(e.y_max(), 1.0);
    }

    #[test]
    fn same_segment_ignores_direction() {
        let a = edge((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let b = edge((1.0, 0.0, 0.0), (0.0, 0.0, 0.0));
        assert!(a.same_segment(&b));
        assert!(!a.same_segment(&edge((0.0, 0.0, 0.0), (1.0, 0.0, 0.5))));
    }

    #[test]
    fn farther_edge_is_split_at_interior_crossing() {
        let near = edge((-1.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let far = edge((0.0, -1.0, 1.0), (0.0, 1.0, 1.0));

        match far.intersect(&near) {
            Intersection::SplitFirst(p) => {
                assert_abs_diff_eq!(p, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12)
            }
            other => panic!("expected the far edge to split, got {other:?}"),
        }
        match near.intersect(&far) {
            Intersection::SplitSecond(p) => {
                assert_abs_diff_eq!(p, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12)
            }
            other => panic!("expected the far edge to split, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_touch_only_splits_the_other_edge() {
        // `near` ends on the interior of `far`.
        let far = edge((-1.0, 0.0, 1.0), (1.0, 0.0, 1.0));
        let near = edge((0.0, 0.0, 0.0), (0.0, 1.0, 0.0));
        assert!(matches!(far.intersect(&near), Intersection::SplitFirst(_)));

        // `far` ends on the interior of `near`: nothing changes visibility.
        let near = edge((-1.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let far = edge((0.0, 0.0, 1.0), (0.0, 1.0, 1.0));
        assert_eq!(far.intersect(&near), Intersection::None);
        assert_eq!(near.intersect(&far), Intersection::None);
    }

    #[test]
    fn parallel_and_disjoint_edges_do_not_split() {
        let a = edge((0.0, 0.0, 0.0), (1.0, 1.0, 0.0));
        let b = edge((0.0, 0.5, 1.0), (1.0, 1.5, 1.0));
        assert_eq!(a.intersect(&b), Intersection::None);

        let c = edge((5.0, -1.0, 1.0), (5.0, 1.0, 1.0));
        assert_eq!(a.intersect(&c), Intersection::None);
    }

    #[test]
    fn shared_endpoints_do_not_split() {
        let a = edge((0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
        let b = edge((0.0, 0.0, 1.0), (0.0, 1.0, 1.0));
        assert_eq!(a.intersect(&b), Intersection::None);
    }

    #[test]
    fn split_halves_share_the_cut_point() {
        let e = edge((0.0, 0.0, 0.0), (0.0, 2.0, 2.0));
        let cut = Vec3::new(0.0, 1.0, 1.0);
        let [lower, upper] = e.split_at(cut);
        assert_eq!(lower.v, [e.v[0], cut]);
        assert_eq!(upper.v, [cut, e.v[1]]);
        assert_abs_diff_eq!(lower.length() + upper.length(), e.length(), epsilon = 1e-12);
    }
}
