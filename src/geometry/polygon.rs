use super::{BBox, Plane, INSIDE_EPS, PLANE_EPS};
use crate::error::PlaneError;
use crate::math::Vec3;

/// A view-space polygon ready for occlusion queries.
///
/// Vertices are counter-clockwise in the XY projection and the plane normal
/// points away from the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedPolygon {
    pub vertices: Vec<Vec3>,
    pub plane: Plane,
    pub bbox: BBox,
    /// The authored order was clockwise and has been reversed.
    pub reversed: bool,
}

impl PreparedPolygon {
    /// Fits the plane and normalizes the winding of an already transformed loop.
    pub fn new(mut vertices: Vec<Vec3>) -> Result<Self, PlaneError> {
        let (plane, reversed) = Plane::fit(&vertices)?.facing_away();
        if reversed {
            vertices.reverse();
        }
        let bbox = BBox::from_points(vertices.iter().copied()).ok_or(PlaneError::Degenerate)?;
        Ok(Self {
            vertices,
            plane,
            bbox,
            reversed,
        })
    }

    /// Cyclic pairs `(v[i], v[i+1])`.
    fn sides(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Convex point-in-polygon test in XY.
    ///
    /// `p` is outside as soon as it falls on the right of one side, i.e.
    /// `(v[i+1] - v[i]) x (p - v[i+1])` is negative. Boundary points are inside.
    pub fn contains_xy(&self, p: Vec3) -> bool {
        let p = p.xy();
        self.sides()
            .all(|(a, b)| (b.xy() - a.xy()).cross(p - b.xy()) >= -INSIDE_EPS)
    }

    /// No reflex corner in the XY projection.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        (0..n).all(|i| {
            let (a, b, c) = (
                self.vertices[i].xy(),
                self.vertices[(i + 1) % n].xy(),
                self.vertices[(i + 2) % n].xy(),
            );
            (b - a).cross(c - b) >= -INSIDE_EPS
        })
    }

    /// Whether this polygon hides the (already viewer-biased) point `p`.
    pub fn occludes(&self, p: Vec3) -> bool {
        if !self.bbox.contains(p.xy()) {
            return false;
        }
        if self.plane.front_distance(p) > -PLANE_EPS {
            return false;
        }
        self.contains_xy(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::TAU;

    fn regular(n: usize, radius: f64, z: f64) -> PreparedPolygon {
        let vertices = (0..n)
            .map(|i| {
                let a = TAU * i as f64 / n as f64;
                Vec3::new(radius * a.cos(), radius * a.sin(), z)
            })
            .collect();
        PreparedPolygon::new(vertices).expect("regular polygon is valid")
    }

    #[test]
    fn clockwise_input_is_reversed() {
        let cw = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        let poly = PreparedPolygon::new(cw).expect("square is valid");
        assert!(poly.reversed);
        assert!(poly.plane.normal.z > 0.0);
        assert!(poly.contains_xy(Vec3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn containment_matches_analytic_classification() {
        let poly = regular(7, 0.8, 0.0);
        // Inradius of a regular heptagon; points inside it are inside the polygon.
        let inradius = 0.8 * (std::f64::consts::PI / 7.0).cos();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let angle = rng.gen_range(0.0..TAU);
            let r = rng.gen_range(0.0..inradius * 0.999);
            let p = Vec3::new(r * angle.cos(), r * angle.sin(), 0.0);
            assert!(poly.contains_xy(p), "{p:?} should be inside");
        }
        for _ in 0..200 {
            let angle = rng.gen_range(0.0..TAU);
            let r = rng.gen_range(0.8001..3.0);
            let p = Vec3::new(r * angle.cos(), r * angle.sin(), 0.0);
            assert!(!poly.contains_xy(p), "{p:?} should be outside");
        }
        for (a, b) in poly.sides() {
            for t in [0.0, 0.25, 0.5, 1.0] {
                let p = a.lerp(b, t);
                assert!(poly.contains_xy(p), "boundary point {p:?} counts as inside");
            }
        }
    }

    #[test]
    fn detects_reflex_corner() {
        let arrow = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.5, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.3, 0.5, 0.0),
        ];
        let poly = PreparedPolygon::new(arrow).expect("arrow is planar");
        assert!(!poly.is_convex());
        assert!(regular(5, 1.0, 0.0).is_convex());
    }

    #[test]
    fn polygon_never_occludes_its_own_biased_boundary() {
        let poly = PreparedPolygon::new(vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.2),
            Vec3::new(0.5, 0.5, 0.4),
            Vec3::new(-0.5, 0.5, 0.2),
        ])
        .expect("tilted square is planar");
        for (a, b) in poly.sides() {
            let mut mid = a.lerp(b, 0.5);
            mid.z -= crate::geometry::VISIBILITY_Z_BIAS;
            assert!(!poly.occludes(mid));
        }
        assert!(poly.occludes(Vec3::new(0.0, 0.0, 5.0)));
        assert!(!poly.occludes(Vec3::new(0.0, 0.0, -5.0)));
    }
}
