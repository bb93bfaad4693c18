//! Pipeline driver.
//!
//! The [`Engine`] owns a [`HiddenLineConfig`] and runs one scene through
//! preparation, fragmentation, visibility classification, and polyline
//! chaining. Emitted points are mapped back out of view space so the result
//! can be drawn with the same view the input was drawn with.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::config::HiddenLineConfig;
use crate::emit::{build_polylines, write_matrix, write_polyline_set, Polyline, PolylineSet};
use crate::error::{Error, Result};
use crate::fragment::fragment;
use crate::math::Mat4;
use crate::prepare::{prepare, PrepareStats};
use crate::scene::{Attributes, Scene};
use crate::visibility::classify;

pub const VISIBLE_OBJECT_NAME: &str = "VISIBLE";
pub const HIDDEN_OBJECT_NAME: &str = "HIDDEN";

/// Counters gathered over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PipelineStats {
    pub prepare: PrepareStats,
    pub splits: usize,
    pub fragments: usize,
    pub visible_fragments: usize,
    pub hidden_fragments: usize,
    pub visible_polylines: usize,
    pub hidden_polylines: usize,
}

/// Result of [`Engine::run`].
#[derive(Clone, Debug)]
pub struct HiddenLineOutput {
    pub view: Mat4,
    pub perspective: Option<Mat4>,
    pub visible: PolylineSet,
    /// Present only when [`HiddenLineConfig::emit_hidden`] is set.
    pub hidden: Option<PolylineSet>,
    pub stats: PipelineStats,
}

impl HiddenLineOutput {
    /// Writes the view matrix, the perspective matrix if any, then the
    /// visible and hidden line objects.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        write_matrix(out, "VIEW_MAT", &self.view)?;
        if let Some(perspective) = &self.perspective {
            write_matrix(out, "PRSP_MAT", perspective)?;
        }
        write_polyline_set(out, &self.visible)?;
        if let Some(hidden) = &self.hidden {
            write_polyline_set(out, hidden)?;
        }
        Ok(())
    }
}

pub struct Engine {
    config: HiddenLineConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Engine {
    pub fn new(config: HiddenLineConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Aborts the run with [`Error::Cancelled`] once `flag` is raised.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &HiddenLineConfig {
        &self.config
    }

    pub fn run(&self, scene: &Scene) -> Result<HiddenLineOutput> {
        let cancel = self.cancel.as_deref();
        self.check_cancelled()?;

        let prepared = prepare(scene, &self.config);
        let mut stats = PipelineStats {
            prepare: prepared.stats,
            ..PipelineStats::default()
        };

        let (fragments, splits) = fragment(prepared.edges, cancel)?;
        stats.splits = splits;
        stats.fragments = fragments.len();

        self.check_cancelled()?;
        let classified = classify(fragments, prepared.polygons, self.config.parallel, cancel)?;
        stats.visible_fragments = classified.visible.len();
        stats.hidden_fragments = classified.hidden.len();

        self.check_cancelled()?;
        let global = scene.global_matrix();
        let to_scene = global.inverse().unwrap_or_else(|| {
            warn!("view matrix is singular, emitting lines in view space");
            Mat4::identity()
        });

        let attributes = prepared.attributes.unwrap_or_default();
        let visible = build_polylines(classified.visible, self.config.max_polyline_len);
        stats.visible_polylines = visible.len();
        let visible = self.visible_set(&attributes, map_polylines(visible, &to_scene));

        let hidden = if self.config.emit_hidden {
            let hidden = build_polylines(classified.hidden, self.config.max_polyline_len);
            stats.hidden_polylines = hidden.len();
            Some(self.hidden_set(&visible, map_polylines(hidden, &to_scene)))
        } else {
            None
        };

        info!(
            "{} polygons, {} edges, {} splits, {} visible / {} hidden fragments",
            stats.prepare.polygons,
            stats.prepare.edges,
            stats.splits,
            stats.visible_fragments,
            stats.hidden_fragments
        );

        Ok(HiddenLineOutput {
            view: scene.view,
            perspective: scene.perspective,
            visible,
            hidden,
            stats,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    fn visible_set(&self, attributes: &Attributes, polylines: Vec<Polyline>) -> PolylineSet {
        PolylineSet {
            name: VISIBLE_OBJECT_NAME.to_string(),
            color: self.config.color.or(attributes.color),
            width: self.config.line_width.or(attributes.width),
            polylines,
        }
    }

    fn hidden_set(&self, visible: &PolylineSet, polylines: Vec<Polyline>) -> PolylineSet {
        PolylineSet {
            name: HIDDEN_OBJECT_NAME.to_string(),
            color: visible
                .color
                .map(|color| color.dimmed(self.config.hidden_color_ratio)),
            width: visible.width.map(|w| w * self.config.hidden_width_ratio),
            polylines,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(HiddenLineConfig::default())
    }
}

fn map_polylines(polylines: Vec<Polyline>, matrix: &Mat4) -> Vec<Polyline> {
    polylines
        .into_iter()
        .map(|polyline| Polyline {
            points: polyline.points.into_iter().map(|p| *matrix * p).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::scene::{LineColor, Poly, SceneObject};
    use crate::transform::Transform;
    use approx::assert_abs_diff_eq;

    fn square(x0: f64, y0: f64, size: f64, z: f64) -> Poly {
        Poly::polygon([
            Vec3::new(x0, y0, z),
            Vec3::new(x0 + size, y0, z),
            Vec3::new(x0 + size, y0 + size, z),
            Vec3::new(x0, y0 + size, z),
        ])
    }

    /// A unit square at z=0 in front of a unit square at z=1 shifted by half.
    fn overlapping_squares() -> Scene {
        Scene::default().with_object(
            SceneObject::new("squares")
                .with_poly(square(-0.5, -0.5, 1.0, 0.0))
                .with_poly(square(0.0, 0.0, 1.0, 1.0)),
        )
    }

    fn total_length(set: &PolylineSet) -> f64 {
        set.total_length()
    }

    #[test]
    fn front_square_hides_a_corner_of_the_back_one() {
        let engine = Engine::new(HiddenLineConfig::default().with_hidden(true));
        let output = engine.run(&overlapping_squares()).unwrap();

        assert_abs_diff_eq!(total_length(&output.visible), 7.0, epsilon = 1e-9);
        let hidden = output.hidden.expect("hidden lines requested");
        assert_abs_diff_eq!(total_length(&hidden), 1.0, epsilon = 1e-9);
        assert_eq!(output.stats.splits, 2);

        for polyline in &hidden.polylines {
            for p in &polyline.points {
                assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-9);
                assert!(p.x <= 0.5 + 1e-9 && p.y <= 0.5 + 1e-9);
            }
        }
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let scene = overlapping_squares();
        let config = HiddenLineConfig::default().with_hidden(true);
        let sequential = Engine::new(config.clone()).run(&scene).unwrap();
        let parallel = Engine::new(config.with_parallel(true)).run(&scene).unwrap();

        assert_eq!(sequential.stats.visible_fragments, parallel.stats.visible_fragments);
        assert_eq!(sequential.stats.hidden_fragments, parallel.stats.hidden_fragments);
    }

    #[test]
    fn visible_and_hidden_lengths_add_up_to_the_input() {
        let scene = overlapping_squares().with_object(
            SceneObject::new("triangle").with_poly(Poly::polygon([
                Vec3::new(-1.0, -1.0, 0.5),
                Vec3::new(1.0, -0.8, 0.5),
                Vec3::new(0.2, 1.2, 0.5),
            ])),
        );
        let triangle = Vec3::new(-1.0, -1.0, 0.5).distance(Vec3::new(1.0, -0.8, 0.5))
            + Vec3::new(1.0, -0.8, 0.5).distance(Vec3::new(0.2, 1.2, 0.5))
            + Vec3::new(0.2, 1.2, 0.5).distance(Vec3::new(-1.0, -1.0, 0.5));

        let engine = Engine::new(HiddenLineConfig::default().with_hidden(true));
        let output = engine.run(&scene).unwrap();
        let hidden = output.hidden.unwrap();

        assert_abs_diff_eq!(
            total_length(&output.visible) + total_length(&hidden),
            8.0 + triangle,
            epsilon = 1e-9
        );
        assert!(total_length(&hidden) > 1.0);
    }

    #[test]
    fn collinear_pieces_are_merged() {
        let scene = Scene::default().with_object(
            SceneObject::new("segments")
                .with_poly(Poly::polyline([Vec3::new(0.4, 0.1, 0.0), Vec3::new(0.8, 0.1, 0.0)]))
                .with_poly(Poly::polyline([Vec3::new(0.0, 0.1, 0.0), Vec3::new(0.4, 0.1, 0.0)]))
                .with_poly(Poly::polyline([Vec3::new(0.8, 0.1, 0.0), Vec3::new(1.2, 0.1, 0.0)])),
        );
        let output = Engine::default().run(&scene).unwrap();

        assert_eq!(output.visible.polylines.len(), 1);
        assert_eq!(output.visible.polylines[0].points.len(), 2);
        assert_abs_diff_eq!(total_length(&output.visible), 1.2, epsilon = 1e-9);
    }

    #[test]
    fn visible_output_is_stable_when_fed_back() {
        let first = Engine::default().run(&overlapping_squares()).unwrap();

        let mut object = SceneObject::new("lines");
        for polyline in &first.visible.polylines {
            object = object.with_poly(Poly::polyline(polyline.points.iter().copied()));
        }
        let second = Engine::default()
            .run(&Scene::default().with_object(object))
            .unwrap();

        assert_eq!(second.stats.splits, 0);
        assert_abs_diff_eq!(
            total_length(&second.visible),
            total_length(&first.visible),
            epsilon = 1e-9
        );
    }

    #[test]
    fn output_is_mapped_back_through_the_view() {
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(0.3, 0.25, 0.3);
        let view = Transform::new().scaled(2.0).translated(0.1, 0.0, 0.0).to_matrix();
        let scene = Scene::new(view)
            .with_object(SceneObject::new("line").with_poly(Poly::polyline([a, b])));

        let output = Engine::default().run(&scene).unwrap();
        let points = &output.visible.polylines[0].points;

        assert_eq!(points.len(), 2);
        let (lo, hi) = if points[0].x < points[1].x {
            (points[0], points[1])
        } else {
            (points[1], points[0])
        };
        assert_abs_diff_eq!(lo, a, epsilon = 1e-9);
        assert_abs_diff_eq!(hi, b, epsilon = 1e-9);
    }

    #[test]
    fn singular_view_falls_back_to_view_space() {
        let scene = Scene::new(Mat4::scaling(1.0, 1.0, 0.0)).with_object(
            SceneObject::new("line")
                .with_poly(Poly::polyline([Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.5, 0.5, 3.0)])),
        );

        let output = Engine::default().run(&scene).unwrap();

        assert_abs_diff_eq!(total_length(&output.visible), 0.5_f64.sqrt(), epsilon = 1e-9);
        for p in &output.visible.polylines[0].points {
            assert_abs_diff_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn attributes_are_inherited_and_dimmed_for_hidden_lines() {
        let scene = Scene::default().with_object(
            SceneObject::new("squares")
                .with_attributes(Attributes {
                    color: Some(LineColor::Rgb([200, 100, 50])),
                    width: Some(2.0),
                })
                .with_poly(square(-0.5, -0.5, 1.0, 0.0))
                .with_poly(square(0.0, 0.0, 1.0, 1.0)),
        );
        let engine = Engine::new(HiddenLineConfig::default().with_hidden(true));
        let output = engine.run(&scene).unwrap();
        let hidden = output.hidden.unwrap();

        assert_eq!(output.visible.color, Some(LineColor::Rgb([200, 100, 50])));
        assert_eq!(output.visible.width, Some(2.0));
        assert_eq!(hidden.color, Some(LineColor::Rgb([100, 50, 25])));
        assert_eq!(hidden.width, Some(1.0));
    }

    #[test]
    fn configured_color_overrides_the_scene() {
        let mut config = HiddenLineConfig::default();
        config.color = Some(LineColor::Indexed(3));
        config.line_width = Some(0.5);

        let output = Engine::new(config).run(&overlapping_squares()).unwrap();

        assert_eq!(output.visible.color, Some(LineColor::Indexed(3)));
        assert_eq!(output.visible.width, Some(0.5));
    }

    #[test]
    fn raised_flag_cancels_the_run() {
        let flag = Arc::new(AtomicBool::new(true));
        let engine = Engine::default().with_cancel_flag(flag);

        assert!(matches!(
            engine.run(&overlapping_squares()),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn written_output_lists_matrices_then_objects() {
        let scene = overlapping_squares().with_perspective(Mat4::identity());
        let output = Engine::new(HiddenLineConfig::default().with_hidden(true))
            .run(&scene)
            .unwrap();

        let mut bytes = Vec::new();
        output.write_to(&mut bytes).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let view = text.find("[OBJECT VIEW_MAT").unwrap();
        let prsp = text.find("[OBJECT PRSP_MAT").unwrap();
        let visible = text.find(" VISIBLE\n").unwrap();
        let hidden = text.find(" HIDDEN\n").unwrap();
        assert!(view < prsp && prsp < visible && visible < hidden);
        assert!(text.contains("[POLYLINE "));
    }
}
