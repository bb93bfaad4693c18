//! Geometry preparation: scene forest in, hash tables out.
//!
//! Every visible object is transformed into view space. True polygons get a
//! plane equation, a consistent winding and a bounding box, and go into the
//! polygon table as occluders. Boundary edges of polygons and polylines go
//! into the edge table, each shared edge only once.

use log::{debug, warn};

use crate::config::HiddenLineConfig;
use crate::geometry::{BBox, Edge, EdgeHashTable, PolygonHashTable, PreparedPolygon};
use crate::math::{Mat4, Vec3};
use crate::scene::{Attributes, Poly, Scene, SceneObject};

/// Counters collected while preparing a scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub polygons: usize,
    pub polylines: usize,
    pub degenerate_polygons: usize,
    pub culled_polygons: usize,
    pub non_convex_polygons: usize,
    pub edges: usize,
    pub duplicate_edges: usize,
    pub dropped_internal_edges: usize,
    pub clipped_edges: usize,
}

/// Output of [`prepare`].
#[derive(Debug)]
pub struct Prepared {
    pub polygons: PolygonHashTable,
    pub edges: EdgeHashTable,
    /// Attributes of the first visible object that carries any.
    pub attributes: Option<Attributes>,
    pub stats: PrepareStats,
}

/// Transforms `scene` into view space and fills both hash tables.
pub fn prepare(scene: &Scene, config: &HiddenLineConfig) -> Prepared {
    let mut preparer = Preparer {
        config,
        global: scene.global_matrix(),
        prepared: Prepared {
            polygons: PolygonHashTable::new(config.hash_buckets),
            edges: EdgeHashTable::new(config.hash_buckets),
            attributes: None,
            stats: PrepareStats::default(),
        },
        warned_non_convex: false,
    };
    for object in &scene.objects {
        preparer.visit(object, Mat4::identity());
    }
    preparer.prepared
}

struct Preparer<'a> {
    config: &'a HiddenLineConfig,
    global: Mat4,
    prepared: Prepared,
    warned_non_convex: bool,
}

impl Preparer<'_> {
    fn visit(&mut self, object: &SceneObject, parent: Mat4) {
        if !object.visible {
            debug!("skipping invisible object {}", object.name);
            return;
        }
        let local = match object.transform {
            Some(transform) => parent * transform,
            None => parent,
        };
        if self.prepared.attributes.is_none() && !object.attributes.is_empty() {
            self.prepared.attributes = Some(object.attributes);
        }

        let effective = self.global * local;
        for poly in &object.polys {
            self.add_poly(poly, effective);
        }
        for child in &object.children {
            self.visit(child, local);
        }
    }

    fn add_poly(&mut self, poly: &Poly, matrix: Mat4) {
        let points: Vec<Vec3> = poly.vertices.iter().map(|v| matrix * v.position).collect();

        if !poly.is_polygon() {
            if points.len() < 2 {
                debug!("skipping polyline with {} vertex", points.len());
                return;
            }
            self.prepared.stats.polylines += 1;
            self.add_edges(poly, &points, points.len() - 1);
            return;
        }

        let polygon = match PreparedPolygon::new(points.clone()) {
            Ok(polygon) => polygon,
            Err(err) => {
                warn!("skipping polygon: {err}: {points:?}");
                self.prepared.stats.degenerate_polygons += 1;
                return;
            }
        };
        if self.config.cull_back_faces && polygon.reversed {
            self.prepared.stats.culled_polygons += 1;
            return;
        }
        if !polygon.is_convex() {
            self.prepared.stats.non_convex_polygons += 1;
            if !self.warned_non_convex {
                warn!("non-convex polygon found, occlusion near it may be wrong: {points:?}");
                self.warned_non_convex = true;
            }
        }

        self.prepared.stats.polygons += 1;
        let count = self
            .config
            .edges_per_polygon
            .map_or(points.len(), |limit| limit.min(points.len()));
        self.add_edges(poly, &points, count);
        self.prepared.polygons.insert(polygon);
    }

    /// Inserts the first `count` edges `(p[i], p[i+1])`, wrapping around.
    fn add_edges(&mut self, poly: &Poly, points: &[Vec3], count: usize) {
        let n = points.len();
        for i in 0..count {
            let internal = poly.vertices[i].internal;
            if internal && !self.config.test_internal_edges {
                self.prepared.stats.dropped_internal_edges += 1;
                continue;
            }

            let edge = Edge::new(points[i], points[(i + 1) % n], internal);
            if edge.is_degenerate() {
                debug!("skipping zero length edge at {:?}", edge.v[0]);
                continue;
            }
            if self.config.clip_to_screen
                && BBox::from_points(edge.v).is_some_and(|bbox| bbox.is_off_screen())
            {
                self.prepared.stats.clipped_edges += 1;
                continue;
            }

            if self.prepared.edges.insert_unique(edge) {
                self.prepared.stats.edges += 1;
            } else {
                self.prepared.stats.duplicate_edges += 1;
            }
        }
    }
}
