use crate::eval::scene::{ResolvedScene, SceneOptions, resolve_scene};
use crate::eval::timeline::{StepCursor, step_cursor};
use crate::foundation::core::{
    Affine, DEFAULT_HEADLINE_PATH, Point, Rect, WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::foundation::error::MechResult;
use crate::geometry::curve::{parse_cubic_path, point_at_length_fraction};
use crate::layout::cache::{FitCache, FitKey};
use crate::layout::fit::{
    FitOptions, FitScope, FitTransform, build_fit_transform, collect_mechanism_points,
    collect_scene_points,
};
use crate::layout::viewport::{ViewportTransform, resolve_viewport_transform};
use crate::render::cues;
use crate::render::style;
use crate::render::surface::{Layer, Surface, SurfaceInfo};
use crate::scene::model::MechanismDefinition;
use crate::schema::registry::MechanismRegistry;
use crate::validate::{MechanismValidator, ValidationGate};

/// Per-renderer drawing options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Logical world size cues are authored in.
    pub world_width: f64,
    pub world_height: f64,
    /// Independent X/Y scaling instead of letterboxing.
    pub stretch_to_fill: bool,
    pub strict_step_cues: bool,
    /// Fit the cue cloud into the view; `None` draws world coordinates as authored.
    pub fit_to_content: Option<FitScope>,
    pub fit: FitOptions,
    pub draw_step_badge: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            stretch_to_fill: false,
            strict_step_cues: false,
            fit_to_content: None,
            fit: FitOptions::default(),
            draw_step_badge: true,
        }
    }
}

impl RenderOptions {
    pub fn with_world(mut self, width: f64, height: f64) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    pub fn with_stretch_to_fill(mut self, stretch: bool) -> Self {
        self.stretch_to_fill = stretch;
        self
    }

    pub fn with_strict_step_cues(mut self, strict: bool) -> Self {
        self.strict_step_cues = strict;
        self
    }

    pub fn with_fit_to_content(mut self, scope: Option<FitScope>) -> Self {
        self.fit_to_content = scope;
        self
    }

    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_step_badge(mut self, draw: bool) -> Self {
        self.draw_step_badge = draw;
        self
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions::default().with_strict_step_cues(self.strict_step_cues)
    }

    /// World size with non-positive or non-finite dimensions replaced by the defaults.
    fn world(&self) -> (f64, f64) {
        let pick = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };
        (
            pick(self.world_width, WORLD_WIDTH),
            pick(self.world_height, WORLD_HEIGHT),
        )
    }

    /// Fit options with the view forced to the world size.
    fn fit_options(&self) -> FitOptions {
        let (w, h) = self.world();
        self.fit.with_view(w, h)
    }
}

/// What one frame drew, for inspection by callers and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInfo<'a> {
    pub cursor: StepCursor,
    pub scene: ResolvedScene<'a>,
    pub surface: SurfaceInfo,
    pub viewport: ViewportTransform,
    pub fit: Option<FitTransform>,
    /// Headline marker position along the definition's path.
    pub marker: Point,
}

/// Draws mechanism frames, owning the fit cache and the validation memo.
#[derive(Debug)]
pub struct FrameRenderer {
    opts: RenderOptions,
    fit_cache: FitCache,
    validator: MechanismValidator,
    gate: ValidationGate,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl FrameRenderer {
    /// Cache capacity and validation gating come from the environment.
    pub fn new(opts: RenderOptions) -> Self {
        Self {
            opts,
            fit_cache: FitCache::from_env(),
            validator: MechanismValidator::new(),
            gate: ValidationGate::from_env(),
        }
    }

    pub fn with_gate(mut self, gate: ValidationGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_fit_cache(mut self, cache: FitCache) -> Self {
        self.fit_cache = cache;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.opts
    }

    pub fn set_options(&mut self, opts: RenderOptions) {
        self.opts = opts;
    }

    pub fn fit_cache(&self) -> &FitCache {
        &self.fit_cache
    }

    pub fn clear_caches(&mut self) {
        self.fit_cache.clear();
        self.validator.clear();
    }

    /// Draw `def` at `progress` onto `surface`.
    ///
    /// `Ok(None)` when the surface has nothing to draw on. Errors only come from dev-mode
    /// validation.
    #[tracing::instrument(skip(self, def, surface), fields(mechanism = %def.id))]
    pub fn render_frame<'a>(
        &mut self,
        def: &'a MechanismDefinition,
        progress: f64,
        surface: &mut dyn Surface,
    ) -> MechResult<Option<FrameInfo<'a>>> {
        let Some(info) = surface.info() else {
            tracing::debug!("surface unavailable; frame skipped");
            return Ok(None);
        };
        let scene_opts = self.opts.scene_options();
        if self.gate.is_enabled() {
            self.validator.validate(def, scene_opts)?;
        }

        surface.clear();
        let (world_w, world_h) = self.opts.world();
        let viewport = resolve_viewport_transform(
            info.width,
            info.height,
            world_w,
            world_h,
            self.opts.stretch_to_fill,
        );
        let base = viewport.to_affine();

        let cursor = step_cursor(def.step_count(), progress);
        let scene = resolve_scene(def, cursor.step_index, scene_opts);
        let fit = self
            .opts
            .fit_to_content
            .and_then(|scope| self.fit_for(def, &scene, scope));

        surface.set_transform(base);
        surface.begin_layer(Layer::Background);
        surface.fill_vertical_gradient(
            Rect::new(0.0, 0.0, world_w, world_h),
            style::BACKGROUND_TOP,
            style::BACKGROUND_BOTTOM,
        );
        surface.end_layer();

        let content = fit.map_or(base, |f| base * f.to_affine());
        surface.set_transform(content);
        draw_scene(surface, &scene, cursor.step_progress);

        if self.opts.draw_step_badge {
            surface.set_transform(base);
            surface.begin_layer(Layer::Badge);
            let (x, y) = style::BADGE_ORIGIN;
            surface.draw_text(&cursor.badge(), Point::new(x, y), &style::badge_text());
            surface.end_layer();
        }
        surface.set_transform(Affine::IDENTITY);

        Ok(Some(FrameInfo {
            cursor,
            scene,
            surface: info,
            viewport,
            fit,
            marker: headline_marker(def, progress),
        }))
    }

    /// Look up `id` in `registry` and draw it; `Ok(None)` when it is not registered.
    pub fn render_registered<'a>(
        &mut self,
        registry: &'a MechanismRegistry,
        id: &str,
        progress: f64,
        surface: &mut dyn Surface,
    ) -> MechResult<Option<FrameInfo<'a>>> {
        match registry.get(id) {
            Some(def) => self.render_frame(def, progress, surface),
            None => {
                tracing::debug!(id, "mechanism not registered");
                Ok(None)
            }
        }
    }

    fn fit_for(
        &mut self,
        def: &MechanismDefinition,
        scene: &ResolvedScene<'_>,
        scope: FitScope,
    ) -> Option<FitTransform> {
        let fit_opts = self.opts.fit_options();
        let scene_opts = self.opts.scene_options();
        let key = FitKey::new(
            def,
            &fit_opts,
            scope,
            scene_opts.strict_step_cues,
            scene.step_index,
        );
        self.fit_cache.get_or_insert_with(key, || {
            tracing::debug!(mechanism = %def.id, ?scope, "fit cache miss");
            let points = match scope {
                FitScope::Mechanism => {
                    collect_mechanism_points(def, scene_opts, fit_opts.arrow_samples)
                }
                FitScope::Step => collect_scene_points(scene, fit_opts.arrow_samples),
            };
            build_fit_transform(&points, &fit_opts)
        })
    }
}

fn draw_scene(surface: &mut dyn Surface, scene: &ResolvedScene<'_>, step_progress: f64) {
    surface.begin_layer(Layer::Bonds);
    for (bond, from, to) in scene.drawable_bonds() {
        cues::paint_bond(surface, from, to, bond.order);
    }
    surface.end_layer();

    surface.begin_layer(Layer::Atoms);
    for atom in &scene.atoms {
        cues::paint_atom(surface, atom);
    }
    surface.end_layer();

    surface.begin_layer(Layer::Dipoles);
    for cue in &scene.dipoles {
        cues::paint_dipole(surface, cue);
    }
    surface.end_layer();

    surface.begin_layer(Layer::LonePairs);
    for cue in &scene.lone_pairs {
        cues::paint_lone_pair(surface, cue);
    }
    surface.end_layer();

    surface.begin_layer(Layer::Electrons);
    for (row, cue) in scene.electron_movement.iter().enumerate() {
        cues::paint_arrow(surface, cue, step_progress, row);
    }
    surface.end_layer();
}

/// Point at `progress` of the headline path's length, falling back to the default path.
pub fn headline_marker(def: &MechanismDefinition, progress: f64) -> Point {
    let curve = parse_cubic_path(&def.path).or_else(|| parse_cubic_path(DEFAULT_HEADLINE_PATH));
    curve.map_or(Point::new(24.0, 84.0), |c| point_at_length_fraction(&c, progress))
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
