//! Scene input: a forest of polygon/polyline objects plus the view.
//!
//! A [`Scene`] is what the loader hands to the pipeline. Objects carry their
//! own polygons, optional local matrix, display attributes, and children;
//! tessellation of curves and surfaces happens before geometry lands here.

use std::path::Path;

use crate::error::Result;
use crate::math::{Mat4, Vec3};

/// One corner of a polygon or polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    /// The edge leaving this vertex was introduced by decomposing a larger
    /// polygon and is not part of the authored outline.
    pub internal: bool,
}

impl Vertex {
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            internal: false,
        }
    }

    pub const fn internal(position: Vec3) -> Self {
        Self {
            position,
            internal: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolyKind {
    /// Closed, planar, convex: occludes and emits a closing edge.
    Polygon,
    /// Open chain: never occludes.
    Polyline,
}

/// An ordered vertex list; cyclic when `kind` is [`PolyKind::Polygon`].
#[derive(Clone, Debug, PartialEq)]
pub struct Poly {
    pub vertices: Vec<Vertex>,
    pub kind: PolyKind,
}

impl Poly {
    pub fn polygon(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            vertices: points.into_iter().map(Vertex::new).collect(),
            kind: PolyKind::Polygon,
        }
    }

    pub fn polyline(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            vertices: points.into_iter().map(Vertex::new).collect(),
            kind: PolyKind::Polyline,
        }
    }

    pub fn is_polygon(&self) -> bool {
        self.kind == PolyKind::Polygon
    }
}

/// Stroke color of emitted lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineColor {
    /// Palette index.
    Indexed(u8),
    Rgb([u8; 3]),
}

impl LineColor {
    /// Scales RGB channels by `ratio`; palette colors cannot be dimmed.
    pub fn dimmed(self, ratio: f64) -> Self {
        match self {
            LineColor::Indexed(_) => self,
            LineColor::Rgb(rgb) => {
                LineColor::Rgb(rgb.map(|c| (f64::from(c) * ratio).round().clamp(0.0, 255.0) as u8))
            }
        }
    }
}

/// Display attributes an object may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attributes {
    pub color: Option<LineColor>,
    pub width: Option<f64>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.width.is_none()
    }
}

/// A named node of the scene forest.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub polys: Vec<Poly>,
    pub attributes: Attributes,
    /// `false` when the object is explicitly invisible or its animation
    /// evaluated to hidden at the current time.
    pub visible: bool,
    /// Local matrix applied before the parent's and the view's.
    pub transform: Option<Mat4>,
    pub children: Vec<SceneObject>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polys: Vec::new(),
            attributes: Attributes::default(),
            visible: true,
            transform: None,
            children: Vec::new(),
        }
    }

    pub fn with_poly(mut self, poly: Poly) -> Self {
        self.polys.push(poly);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_child(mut self, child: SceneObject) -> Self {
        self.children.push(child);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Everything one hidden-line run consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub view: Mat4,
    pub perspective: Option<Mat4>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Mat4::identity())
    }
}

impl Scene {
    pub fn new(view: Mat4) -> Self {
        Self {
            objects: Vec::new(),
            view,
            perspective: None,
        }
    }

    pub fn with_object(mut self, object: SceneObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_perspective(mut self, perspective: Mat4) -> Self {
        self.perspective = Some(perspective);
        self
    }

    /// `perspective * view`, the matrix shared by every object.
    pub fn global_matrix(&self) -> Mat4 {
        match self.perspective {
            Some(perspective) => perspective * self.view,
            None => self.view,
        }
    }

    /// Load a Wavefront OBJ file, one object per OBJ model.
    ///
    /// Faces are kept as authored (no triangulation); two-vertex faces become
    /// polylines. A material's diffuse color becomes the object's RGB color.
    pub fn from_obj(file_path: impl AsRef<Path>, view: Mat4) -> Result<Self> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: true,
            ignore_lines: false,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(file_path.as_ref(), &options)?;
        let materials = materials.unwrap_or_else(|err| {
            log::warn!("ignoring OBJ materials: {err}");
            Vec::new()
        });

        let mut scene = Scene::new(view);
        for model in models {
            let mut object = SceneObject::new(model.name);
            object.polys = obj_mesh_polys(&model.mesh);
            if let Some(diffuse) = model
                .mesh
                .material_id
                .and_then(|id| materials.get(id))
                .and_then(|material| material.diffuse)
            {
                object.attributes.color = Some(LineColor::Rgb(
                    diffuse.map(|c| (f64::from(c) * 255.0).round().clamp(0.0, 255.0) as u8),
                ));
            }
            scene.objects.push(object);
        }
        Ok(scene)
    }
}

fn obj_mesh_polys(mesh: &tobj::Mesh) -> Vec<Poly> {
    let position = |index: u32| {
        let i = index as usize * 3;
        Vec3::new(
            f64::from(mesh.positions[i]),
            f64::from(mesh.positions[i + 1]),
            f64::from(mesh.positions[i + 2]),
        )
    };

    // No arities means every face is a triangle.
    let arities: Vec<usize> = if mesh.face_arities.is_empty() {
        vec![3; mesh.indices.len() / 3]
    } else {
        mesh.face_arities.iter().map(|&a| a as usize).collect()
    };

    let mut polys = Vec::with_capacity(arities.len());
    let mut start = 0;
    for arity in arities {
        let Some(face) = mesh.indices.get(start..start + arity) else {
            break;
        };
        start += arity;
        let points = face.iter().map(|&index| position(index));
        polys.push(if arity >= 3 {
            Poly::polygon(points)
        } else {
            Poly::polyline(points)
        });
    }
    polys
}
