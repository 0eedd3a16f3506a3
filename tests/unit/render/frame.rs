use super::*;
use crate::render::support::{Call, Recorder};
use crate::scene::model::{AtomCue, BondCue, Lifetime};
use serde_json::json;

fn renderer(opts: RenderOptions) -> FrameRenderer {
    FrameRenderer::new(opts)
        .with_gate(ValidationGate::always())
        .with_fit_cache(FitCache::new(8))
}

fn three_steps() -> MechanismDefinition {
    serde_json::from_value(json!({
        "id": "sn2",
        "title": "SN2",
        "summary": "Backside attack.",
        "path": "M 24 84 C 92 26, 268 26, 336 84",
        "steps": ["approach", "attack", "leave"],
        "atoms": [
            {"id": "c1", "x": 180, "y": 90, "label": "C", "step": 0},
            {"id": "br", "x": 240, "y": 90, "label": "Br", "step": 0},
            {"id": "o1", "x": 100, "y": 90, "label": "O", "step": 1}
        ],
        "bonds": [{"from": "c1", "to": "br", "step": 0}],
        "dipoles": [{"x": 180, "y": 70, "text": "delta+", "step": 0}],
        "electronMovement": [
            {"path": "M 100 90 C 120 60, 160 60, 180 90", "label": "attack", "step": 1}
        ]
    }))
    .unwrap()
}

fn cache_contract() -> MechanismDefinition {
    serde_json::from_value(json!({
        "id": "cache-contract",
        "title": "Cache contract",
        "summary": "Two steps that move the same pair.",
        "path": "M 24 84 C 92 26, 268 26, 336 84",
        "steps": ["one", "two"],
        "atoms": [
            {"id": "a", "x": 40, "y": 90, "label": "C", "step": 0},
            {"id": "b", "x": 120, "y": 90, "label": "C", "step": 0},
            {"id": "a", "x": 220, "y": 90, "label": "C", "step": 1},
            {"id": "b", "x": 300, "y": 90, "label": "C", "step": 1}
        ],
        "bonds": [
            {"from": "a", "to": "b", "step": 0},
            {"from": "a", "to": "b", "step": 1}
        ]
    }))
    .unwrap()
}

#[test]
fn detached_surface_draws_nothing() {
    let def = three_steps();
    let mut rec = Recorder::detached();
    let out = renderer(RenderOptions::default())
        .render_frame(&def, 0.5, &mut rec)
        .unwrap();
    assert!(out.is_none());
    assert!(rec.calls.is_empty());
}

#[test]
fn layers_paint_in_order() {
    let def = three_steps();
    let mut rec = Recorder::new(360.0, 180.0);
    renderer(RenderOptions::default())
        .render_frame(&def, 0.5, &mut rec)
        .unwrap();
    assert_eq!(rec.calls[0], Call::Clear);
    assert_eq!(
        rec.layers(),
        vec![
            Layer::Background,
            Layer::Bonds,
            Layer::Atoms,
            Layer::Dipoles,
            Layer::LonePairs,
            Layer::Electrons,
            Layer::Badge
        ]
    );
    assert_eq!(
        rec.in_layer(Layer::Background),
        vec![&Call::Gradient(Rect::new(0.0, 0.0, 360.0, 180.0))]
    );
}

#[test]
fn midpoint_of_three_steps_is_step_two() {
    let def = three_steps();
    let mut rec = Recorder::new(360.0, 180.0);
    let frame = renderer(RenderOptions::default())
        .render_frame(&def, 0.5, &mut rec)
        .unwrap()
        .unwrap();
    assert_eq!(frame.cursor.step_index, 1);
    assert!((frame.cursor.step_progress - 0.5).abs() < 1e-9);
    assert!(frame.scene.atom("c1").is_some());
    assert!(rec.texts().contains(&"Step 2/3"));
    // The step-0 dipole carries forward.
    assert!(rec.texts().contains(&"δ+"));
}

#[test]
fn arrows_only_draw_on_their_step() {
    let def = three_steps();
    let mut r = renderer(RenderOptions::default());
    for (progress, expect) in [(0.1, 0), (0.5, 1), (0.9, 0)] {
        let mut rec = Recorder::new(360.0, 180.0);
        let frame = r.render_frame(&def, progress, &mut rec).unwrap().unwrap();
        assert_eq!(frame.scene.electron_movement.len(), expect, "progress {progress}");
        let strokes = rec
            .in_layer(Layer::Electrons)
            .into_iter()
            .filter(|c| matches!(c, Call::StrokePath(..)))
            .count();
        assert_eq!(strokes, expect);
    }
}

#[test]
fn contain_viewport_letterboxes() {
    let def = three_steps();
    let mut rec = Recorder::new(900.0, 300.0);
    let frame = renderer(RenderOptions::default())
        .render_frame(&def, 0.0, &mut rec)
        .unwrap()
        .unwrap();
    assert!(frame.viewport.is_uniform());
    assert!((frame.viewport.scale_x - 300.0 / 180.0).abs() < 1e-9);
    assert!((frame.viewport.offset_x - 150.0).abs() < 1e-9);
    assert!(rec.calls.contains(&Call::Transform(frame.viewport.to_affine())));
}

#[test]
fn stretch_scales_axes_independently() {
    let def = three_steps();
    let mut rec = Recorder::new(540.0, 240.0);
    let frame = renderer(RenderOptions::default().with_stretch_to_fill(true))
        .render_frame(&def, 0.0, &mut rec)
        .unwrap()
        .unwrap();
    assert!((frame.viewport.scale_x - 1.5).abs() < 1e-9);
    assert!((frame.viewport.scale_y - 240.0 / 180.0).abs() < 1e-9);
}

#[test]
fn no_fit_unless_requested() {
    let def = cache_contract();
    let mut rec = Recorder::new(360.0, 180.0);
    let mut r = renderer(RenderOptions::default());
    let frame = r.render_frame(&def, 0.3, &mut rec).unwrap().unwrap();
    assert_eq!(frame.fit, None);
    assert!(r.fit_cache().is_empty());
}

#[test]
fn mechanism_fit_is_stable_across_steps() {
    let def = cache_contract();
    let mut r = renderer(RenderOptions::default().with_fit_to_content(Some(FitScope::Mechanism)));
    let mut rec = Recorder::new(360.0, 180.0);
    let early = r.render_frame(&def, 0.05, &mut rec).unwrap().unwrap().fit;
    let late = r.render_frame(&def, 0.95, &mut rec).unwrap().unwrap().fit;
    assert!(early.is_some());
    assert_eq!(early, late);
    let stats = r.fit_cache().stats();
    assert_eq!((stats.misses, stats.hits), (1, 1));

    let fitted = base_then_fit(&rec);
    assert_eq!(fitted, Some(early.unwrap().to_affine()));
}

/// Transform applied right after the background layer closes.
fn base_then_fit(rec: &Recorder) -> Option<Affine> {
    let end = rec.calls.iter().position(|c| *c == Call::End)?;
    match rec.calls.get(end + 1) {
        Some(Call::Transform(t)) => Some(*t),
        _ => None,
    }
}

#[test]
fn step_fit_follows_the_active_step() {
    let def = cache_contract();
    let mut r = renderer(RenderOptions::default().with_fit_to_content(Some(FitScope::Step)));
    let mut rec = Recorder::new(360.0, 180.0);
    let first = r.render_frame(&def, 0.05, &mut rec).unwrap().unwrap().fit.unwrap();
    let second = r.render_frame(&def, 0.95, &mut rec).unwrap().unwrap().fit.unwrap();
    assert_ne!(first.offset_x, second.offset_x);
    assert_eq!(r.fit_cache().len(), 2);
}

#[test]
fn badge_sits_outside_the_fit() {
    let def = cache_contract();
    let mut rec = Recorder::new(360.0, 180.0);
    renderer(RenderOptions::default().with_fit_to_content(Some(FitScope::Mechanism)))
        .render_frame(&def, 0.0, &mut rec)
        .unwrap();
    let badge = rec.calls.iter().rposition(|c| *c == Call::Begin(Layer::Badge)).unwrap();
    assert_eq!(rec.calls[badge - 1], Call::Transform(Affine::IDENTITY));
    assert!(matches!(&rec.calls[badge + 1], Call::Text(t, p, _) if t == "Step 1/2" && *p == Point::new(10.0, 12.0)));
}

#[test]
fn badge_can_be_disabled() {
    let def = three_steps();
    let mut rec = Recorder::new(360.0, 180.0);
    renderer(RenderOptions::default().with_step_badge(false))
        .render_frame(&def, 0.0, &mut rec)
        .unwrap();
    assert!(!rec.layers().contains(&Layer::Badge));
}

#[test]
fn invalid_definitions_fail_when_validation_is_on() {
    let mut def = three_steps();
    def.bonds.push(BondCue {
        from: "c1".into(),
        to: "ghost".into(),
        order: 1,
        lifetime: Lifetime::ALWAYS,
    });
    let mut rec = Recorder::new(360.0, 180.0);
    let err = renderer(RenderOptions::default())
        .render_frame(&def, 0.5, &mut rec)
        .unwrap_err();
    assert!(err.to_string().contains("unknown atoms"), "{err}");

    let mut lenient = FrameRenderer::new(RenderOptions::default()).with_gate(ValidationGate::never());
    let frame = lenient.render_frame(&def, 0.5, &mut rec).unwrap().unwrap();
    assert_eq!(frame.scene.drawable_bonds().count(), 1);
}

#[test]
fn marker_tracks_the_headline_path() {
    let def = three_steps();
    assert!((headline_marker(&def, 0.0) - Point::new(24.0, 84.0)).hypot() < 1e-6);
    assert!((headline_marker(&def, 1.0) - Point::new(336.0, 84.0)).hypot() < 1e-6);

    let mut broken = def.clone();
    broken.path = "not a path".into();
    assert_eq!(headline_marker(&broken, 0.0), headline_marker(&def, 0.0));
}

#[test]
fn unregistered_ids_render_nothing() {
    let registry = MechanismRegistry::default();
    let mut rec = Recorder::new(360.0, 180.0);
    let out = renderer(RenderOptions::default())
        .render_registered(&registry, "missing", 0.5, &mut rec)
        .unwrap();
    assert!(out.is_none());
    assert!(rec.calls.is_empty());
}

#[test]
fn clear_caches_empties_the_fit_cache() {
    let def = cache_contract();
    let mut r = renderer(RenderOptions::default().with_fit_to_content(Some(FitScope::Mechanism)));
    let mut rec = Recorder::new(360.0, 180.0);
    r.render_frame(&def, 0.5, &mut rec).unwrap();
    assert_eq!(r.fit_cache().len(), 1);
    r.clear_caches();
    assert!(r.fit_cache().is_empty());
}

#[test]
fn atoms_without_labels_still_render() {
    let mut def = MechanismDefinition::empty("bare", vec!["only".into()]);
    def.atoms.push(AtomCue {
        id: "x".into(),
        x: 10.0,
        y: 10.0,
        label: String::new(),
        charge: 0.0,
        lifetime: Lifetime::ALWAYS,
    });
    let mut rec = Recorder::new(360.0, 180.0);
    renderer(RenderOptions::default())
        .render_frame(&def, 0.0, &mut rec)
        .unwrap();
    assert_eq!(rec.texts(), vec!["Step 1/1"]);
}
