//! Per-cue painters. Everything here draws in world (or fitted world) units.

use crate::foundation::core::{BezPath, Point, Vec2};
use crate::foundation::math::clamp_unit;
use crate::geometry::curve::{point_at, tangent_at};
use crate::render::style;
use crate::render::surface::{LineCap, StrokeStyle, Surface};
use crate::scene::model::{ArrowCue, AtomCue, DipoleCue, LonePairCue};
use kurbo::ParamCurve;
use std::f64::consts::FRAC_PI_6;

/// One stroke for single bonds, two offset strokes for double and triple bonds.
pub(crate) fn paint_bond(surface: &mut dyn Surface, from: &AtomCue, to: &AtomCue, order: u8) {
    let (a, b) = (Point::new(from.x, from.y), Point::new(to.x, to.y));
    let d = b - a;
    let len = match d.hypot() {
        l if l > 0.0 => l,
        _ => 1.0,
    };
    let normal = Vec2::new(-d.y / len, d.x / len) * style::BOND_OFFSET;
    let stroke = StrokeStyle::solid(style::BOND_WIDTH, style::BOND_COLOR).with_cap(LineCap::Round);

    let offsets: &[f64] = if order >= 2 {
        &style::BOND_MULTI_OFFSETS
    } else {
        &[0.0]
    };
    for &k in offsets {
        let shift = normal * k;
        let mut line = BezPath::new();
        line.move_to(a + shift);
        line.line_to(b + shift);
        surface.stroke_path(&line, &stroke);
    }
}

pub(crate) fn paint_atom(surface: &mut dyn Surface, atom: &AtomCue) {
    let center = Point::new(atom.x, atom.y);
    let look = style::atom_style(&atom.label);

    surface.fill_circle(
        center + Vec2::new(0.0, style::ATOM_SHADOW_DY),
        style::ATOM_RADIUS,
        style::atom_shadow(),
    );
    surface.fill_circle(center, style::ATOM_RADIUS, look.fill);
    surface.stroke_circle(
        center,
        style::ATOM_RADIUS,
        &StrokeStyle::solid(style::ATOM_OUTLINE_WIDTH, style::atom_outline()),
    );
    if !atom.label.is_empty() {
        surface.draw_text(
            &atom.label,
            center + Vec2::new(0.0, style::ATOM_LABEL_DY),
            &style::label_text(look.text),
        );
    }
}

pub(crate) fn paint_dipole(surface: &mut dyn Surface, cue: &DipoleCue) {
    surface.draw_text(
        &cue.display_text(),
        Point::new(cue.x, cue.y),
        &style::dipole_text(),
    );
}

pub(crate) fn paint_lone_pair(surface: &mut dyn Surface, cue: &LonePairCue) {
    let (dx, dy) = (style::LONE_PAIR_DX, style::LONE_PAIR_DY);
    for p in [
        Point::new(cue.x - dx, cue.y - dy),
        Point::new(cue.x + dx, cue.y + dy),
    ] {
        surface.fill_circle(p, style::LONE_PAIR_DOT_RADIUS, style::LONE_PAIR_DOT);
    }
    if !cue.label.is_empty() {
        surface.draw_text(
            &cue.label,
            Point::new(cue.x, cue.y + style::LONE_PAIR_LABEL_DY),
            &style::lone_pair_text(),
        );
    }
}

/// Where the arrowhead sits for a given within-step progress.
pub fn arrow_head_t(step_progress: f64) -> f64 {
    (step_progress + 0.05).clamp(0.05, 1.0)
}

/// Dashed partial curve, arrowhead and trailing electron. Unparseable paths draw nothing.
pub(crate) fn paint_arrow(
    surface: &mut dyn Surface,
    cue: &ArrowCue,
    step_progress: f64,
    label_row: usize,
) {
    let Some(curve) = cue.curve() else {
        return;
    };
    let t = arrow_head_t(step_progress);
    let head = point_at(&curve, t);
    let tangent = tangent_at(&curve, t);
    let angle = tangent.y.atan2(tangent.x);

    let mut body = BezPath::new();
    body.move_to(curve.p0);
    let partial = curve.subsegment(0.0..t);
    body.curve_to(partial.p1, partial.p2, partial.p3);
    surface.stroke_path(
        &body,
        &StrokeStyle::solid(style::ARROW_WIDTH, style::ARROW_STROKE).with_dash(&style::ARROW_DASH),
    );

    let size = style::ARROW_HEAD_SIZE;
    let wing = |a: f64| head - Vec2::new(size * a.cos(), size * a.sin());
    let mut tip = BezPath::new();
    tip.move_to(head);
    tip.line_to(wing(angle - FRAC_PI_6));
    tip.line_to(wing(angle + FRAC_PI_6));
    tip.close_path();
    surface.fill_path(&tip, style::ARROW_HEAD);

    let electron = point_at(&curve, clamp_unit(t - style::ELECTRON_LAG));
    surface.fill_circle(electron, style::ELECTRON_RADIUS, style::ELECTRON_DOT);

    if !cue.label.is_empty() {
        let (x, y) = style::ARROW_LABEL_ORIGIN;
        surface.draw_text(
            &cue.label,
            Point::new(x, y - label_row as f64 * style::ARROW_LABEL_ROW),
            &style::label_text(style::ELECTRON_DOT),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cues.rs"]
mod tests;
