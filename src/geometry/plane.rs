use super::PLANE_FIT_EPS;
use crate::error::PlaneError;
use crate::math::{Vec2, Vec3};

/// Plane `normal · p + offset = 0` with a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f64,
}

impl Plane {
    /// Fits a plane through a vertex loop.
    ///
    /// Every consecutive (cyclic) vertex triple is a candidate; the one with
    /// the largest cross product wins since it is the least sensitive to
    /// rounding. The normal follows the right-hand rule over the loop order.
    pub fn fit(vertices: &[Vec3]) -> Result<Plane, PlaneError> {
        let n = vertices.len();
        if n < 3 {
            return Err(PlaneError::TooFewVertices(n));
        }

        let (corner, cross) = (0..n)
            .map(|i| {
                let (a, b, c) = (vertices[i], vertices[(i + 1) % n], vertices[(i + 2) % n]);
                (b, (b - a).cross(c - b))
            })
            .max_by(|(_, x), (_, y)| x.magnitude().total_cmp(&y.magnitude()))
            .ok_or(PlaneError::Degenerate)?;

        let magnitude = cross.magnitude();
        if !(magnitude > PLANE_FIT_EPS) {
            return Err(PlaneError::Degenerate);
        }

        let normal = cross / magnitude;
        Ok(Plane {
            normal,
            offset: -normal.dot(corner),
        })
    }

    /// Returns the plane with `normal.z >= 0` and whether it had to flip.
    pub fn facing_away(self) -> (Plane, bool) {
        if self.normal.z < 0.0 {
            (
                Plane {
                    normal: -self.normal,
                    offset: -self.offset,
                },
                true,
            )
        } else {
            (self, false)
        }
    }

    /// Signed distance of `p`, positive on the viewer's side.
    ///
    /// Meaningful once the plane faces away from the viewer (`normal.z >= 0`).
    #[inline]
    pub fn front_distance(&self, p: Vec3) -> f64 {
        -(self.normal.dot(p) + self.offset)
    }
}

/// Axis-aligned box in the XY projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BBox {
    /// Box of a point set; `None` when the set is empty.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<BBox> {
        let mut points = points.into_iter();
        let first = points.next()?.xy();
        Some(points.fold(
            BBox {
                min: first,
                max: first,
            },
            |bbox, p| BBox {
                min: Vec2::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y)),
                max: Vec2::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y)),
            },
        ))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Entirely outside the `[-1,1] x [-1,1]` screen square.
    pub fn is_off_screen(&self) -> bool {
        self.max.x < -1.0 || self.min.x > 1.0 || self.max.y < -1.0 || self.min.y > 1.0
    }
}
