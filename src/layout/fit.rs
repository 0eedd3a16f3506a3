//! Content-fit transform: translate + uniform scale mapping a cue point cloud into a padded view.

use crate::eval::scene::{ResolvedScene, SceneOptions, resolve_scene};
use crate::foundation::core::{Affine, Point, Vec2, WORLD_HEIGHT, WORLD_WIDTH};
use crate::foundation::math::StableHasher;
use crate::geometry::curve::{DEFAULT_CURVE_SAMPLES, sample_curve};
use crate::scene::model::MechanismDefinition;

/// Which point cloud a fit is computed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitScope {
    /// Union of every step's cues; one transform for the whole playback.
    #[default]
    Mechanism,
    /// Only the active step's cues.
    Step,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    pub view_width: f64,
    pub view_height: f64,
    pub padding: f64,
    pub top_inset: f64,
    pub bottom_inset: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Segments sampled per arrow curve when collecting points.
    pub arrow_samples: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            view_width: WORLD_WIDTH,
            view_height: WORLD_HEIGHT,
            padding: 20.0,
            top_inset: 18.0,
            bottom_inset: 22.0,
            min_scale: 0.75,
            max_scale: 2.4,
            arrow_samples: DEFAULT_CURVE_SAMPLES,
        }
    }
}

impl FitOptions {
    pub fn with_view(mut self, width: f64, height: f64) -> Self {
        self.view_width = width;
        self.view_height = height;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_insets(mut self, top: f64, bottom: f64) -> Self {
        self.top_inset = top;
        self.bottom_inset = bottom;
        self
    }

    pub fn with_scale_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_scale = min;
        self.max_scale = max;
        self
    }

    pub fn with_arrow_samples(mut self, samples: usize) -> Self {
        self.arrow_samples = samples;
        self
    }

    /// Replace non-finite or non-positive fields with their defaults.
    fn sanitized(self) -> Self {
        let d = Self::default();
        let positive = |v: f64, f: f64| if v.is_finite() && v > 0.0 { v } else { f };
        let finite = |v: f64, f: f64| if v.is_finite() { v } else { f };
        Self {
            view_width: positive(self.view_width, d.view_width),
            view_height: positive(self.view_height, d.view_height),
            padding: finite(self.padding, d.padding),
            top_inset: finite(self.top_inset, d.top_inset),
            bottom_inset: finite(self.bottom_inset, d.bottom_inset),
            min_scale: finite(self.min_scale, d.min_scale),
            max_scale: finite(self.max_scale, d.max_scale),
            arrow_samples: self.arrow_samples,
        }
    }

    pub(crate) fn fingerprint(&self) -> u64 {
        let mut h = StableHasher::new();
        h.write_f64(self.view_width);
        h.write_f64(self.view_height);
        h.write_f64(self.padding);
        h.write_f64(self.top_inset);
        h.write_f64(self.bottom_inset);
        h.write_f64(self.min_scale);
        h.write_f64(self.max_scale);
        h.write_u64(self.arrow_samples as u64);
        h.finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    /// Scale about the origin, then translate.
    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.offset_x, self.offset_y)) * Affine::scale(self.scale)
    }
}

/// Fit `points` into the padded view. `None` for fewer than two points or a non-finite
/// bounding box; callers then draw without a fit.
pub fn build_fit_transform(points: &[Point], opts: &FitOptions) -> Option<FitTransform> {
    if points.len() < 2 {
        return None;
    }
    let o = opts.sanitized();

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }

    let content_w = (max_x - min_x).max(1.0);
    let content_h = (max_y - min_y).max(1.0);
    let avail_w = (o.view_width - o.padding * 2.0).max(1.0);
    let avail_h = (o.view_height - o.top_inset - o.bottom_inset).max(1.0);

    let raw = (avail_w / content_w).min(avail_h / content_h);
    let scale = raw.min(o.max_scale).max(o.min_scale);

    Some(FitTransform {
        scale,
        offset_x: o.padding + (avail_w - content_w * scale) / 2.0 - min_x * scale,
        offset_y: o.top_inset + (avail_h - content_h * scale) / 2.0 - min_y * scale,
    })
}

/// Atom, dipole and lone-pair anchors plus sampled arrow curves of one resolved scene.
///
/// Arrows contribute points along the bent curve, never raw control points.
pub fn collect_scene_points(scene: &ResolvedScene<'_>, arrow_samples: usize) -> Vec<Point> {
    let mut points = Vec::new();
    let mut push = |x: f64, y: f64| {
        if x.is_finite() && y.is_finite() {
            points.push(Point::new(x, y));
        }
    };
    for a in &scene.atoms {
        push(a.x, a.y);
    }
    for d in &scene.dipoles {
        push(d.x, d.y);
    }
    for l in &scene.lone_pairs {
        push(l.x, l.y);
    }
    for cue in &scene.electron_movement {
        if let Some(curve) = cue.curve() {
            for p in sample_curve(&curve, arrow_samples) {
                push(p.x, p.y);
            }
        }
    }
    points
}

/// Union of every step's scene points.
pub fn collect_mechanism_points(
    def: &MechanismDefinition,
    scene_opts: SceneOptions,
    arrow_samples: usize,
) -> Vec<Point> {
    (0..def.step_count())
        .flat_map(|step| collect_scene_points(&resolve_scene(def, step, scene_opts), arrow_samples))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
