//! Knobs of a hidden-line run.

/// Default number of Y buckets in the edge and polygon hash tables.
pub const DEFAULT_HASH_BUCKETS: usize = 500;

/// Default cap on the vertex count of one emitted polyline.
pub const DEFAULT_MAX_POLYLINE_LEN: usize = 1000;

/// Options for [`Engine`](crate::Engine).
///
/// Fields may be set directly; the `with_*` setters chain.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenLineConfig {
    /// Drop polygons whose normal faced away from the viewer.
    pub cull_back_faces: bool,
    /// Emit a second `HIDDEN` object with the occluded fragments.
    pub emit_hidden: bool,
    /// Keep and test edges tagged internal instead of dropping them.
    pub test_internal_edges: bool,
    /// Emit only the first `k` edges of every polygon. The polygon still occludes.
    pub edges_per_polygon: Option<usize>,
    /// Reject edges whose bounding box is entirely outside `[-1,1]x[-1,1]`.
    pub clip_to_screen: bool,
    /// Overrides the stroke width inherited from the scene.
    pub line_width: Option<f64>,
    /// Overrides the color inherited from the scene.
    pub color: Option<crate::scene::LineColor>,
    /// RGB scale applied to the hidden object's color.
    pub hidden_color_ratio: f64,
    /// Scale applied to the hidden object's width.
    pub hidden_width_ratio: f64,
    /// Number of Y buckets. Affects speed only.
    pub hash_buckets: usize,
    /// Classify fragments on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// Maximal number of vertices in one emitted polyline.
    pub max_polyline_len: usize,
}

impl Default for HiddenLineConfig {
    fn default() -> Self {
        Self {
            cull_back_faces: false,
            emit_hidden: false,
            test_internal_edges: false,
            edges_per_polygon: None,
            clip_to_screen: false,
            line_width: None,
            color: None,
            hidden_color_ratio: 0.5,
            hidden_width_ratio: 0.5,
            hash_buckets: DEFAULT_HASH_BUCKETS,
            parallel: false,
            max_polyline_len: DEFAULT_MAX_POLYLINE_LEN,
        }
    }
}

impl HiddenLineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_back_face_culling(mut self, enabled: bool) -> Self {
        self.cull_back_faces = enabled;
        self
    }

    pub fn with_hidden(mut self, enabled: bool) -> Self {
        self.emit_hidden = enabled;
        self
    }

    pub fn with_internal_edges(mut self, enabled: bool) -> Self {
        self.test_internal_edges = enabled;
        self
    }

    pub fn with_edges_per_polygon(mut self, limit: Option<usize>) -> Self {
        self.edges_per_polygon = limit;
        self
    }

    pub fn with_screen_clipping(mut self, enabled: bool) -> Self {
        self.clip_to_screen = enabled;
        self
    }

    pub fn with_hash_buckets(mut self, buckets: usize) -> Self {
        self.hash_buckets = buckets.max(1);
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn with_max_polyline_len(mut self, len: usize) -> Self {
        self.max_polyline_len = len.max(2);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_degenerate_sizes() {
        let config = HiddenLineConfig::new()
            .with_hash_buckets(0)
            .with_max_polyline_len(1);
        assert_eq!(config.hash_buckets, 1);
        assert_eq!(config.max_polyline_len, 2);
    }

    #[test]
    fn defaults_emit_visible_only() {
        let config = HiddenLineConfig::default();
        assert!(!config.emit_hidden);
        assert!(!config.test_internal_edges);
        assert_eq!(config.hash_buckets, DEFAULT_HASH_BUCKETS);
    }
}
