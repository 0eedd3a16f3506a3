//! Cubic Bezier kernel for electron-movement arrows and the headline marker path.
//!
//! Curves are authored as `M x0 y0 C x1 y1, x2 y2, x3 y3` in world space. Everything here is
//! total: malformed input yields `None`, never a panic.

use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point, Vec2};

/// Smallest accepted bend factor.
pub const MIN_BEND: f64 = 0.5;
/// Largest accepted bend factor.
pub const MAX_BEND: f64 = 4.0;

/// Default number of segments used when sampling a curve for bounds.
pub const DEFAULT_CURVE_SAMPLES: usize = 14;
const MIN_CURVE_SAMPLES: usize = 4;
const MAX_CURVE_SAMPLES: usize = 48;

const ARCLEN_ACCURACY: f64 = 1e-3;

/// Parse the two-endpoint cubic path notation.
///
/// Matching is case-insensitive on the `M`/`C` commands, tolerant of any whitespace, and accepts
/// one optional comma before every coordinate. Leading text before the first `M` and trailing
/// text after the last coordinate are ignored.
pub fn parse_cubic_path(text: &str) -> Option<CubicBez> {
    text.char_indices()
        .filter(|(_, c)| matches!(c, 'M' | 'm'))
        .find_map(|(i, _)| parse_from_move(&text[i + 1..]))
}

fn parse_from_move(rest: &str) -> Option<CubicBez> {
    let mut cur = Cursor::new(rest);
    let x0 = cur.number()?;
    let y0 = cur.number()?;
    cur.comma();
    cur.skip_ws();
    if !cur.eat(|c| matches!(c, 'C' | 'c')) {
        return None;
    }
    let x1 = cur.number()?;
    let y1 = cur.number()?;
    let x2 = cur.number()?;
    let y2 = cur.number()?;
    let x3 = cur.number()?;
    let y3 = cur.number()?;

    Some(CubicBez::new((x0, y0), (x1, y1), (x2, y2), (x3, y3)))
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, pred: impl Fn(char) -> bool) -> bool {
        match self.rest.chars().next() {
            Some(c) if pred(c) => {
                self.rest = &self.rest[c.len_utf8()..];
                true
            }
            _ => false,
        }
    }

    fn comma(&mut self) {
        self.skip_ws();
        self.eat(|c| c == ',');
    }

    /// An optional comma, then a maximal run of `[-0-9.]` that must parse to a finite number.
    fn number(&mut self) -> Option<f64> {
        self.comma();
        self.skip_ws();
        let len = self
            .rest
            .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
            .unwrap_or(self.rest.len());
        if len == 0 {
            return None;
        }
        let (tok, rest) = self.rest.split_at(len);
        self.rest = rest;
        tok.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Format a curve back into the authored path notation.
pub fn format_cubic_path(c: &CubicBez) -> String {
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        fmt_coord(c.p0.x),
        fmt_coord(c.p0.y),
        fmt_coord(c.p1.x),
        fmt_coord(c.p1.y),
        fmt_coord(c.p2.x),
        fmt_coord(c.p2.y),
        fmt_coord(c.p3.x),
        fmt_coord(c.p3.y),
    )
}

fn fmt_coord(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

/// Position on the curve. Callers clamp `t` into `[0, 1]`.
pub fn point_at(c: &CubicBez, t: f64) -> Point {
    c.eval(t)
}

/// Unnormalized derivative at `t`.
pub fn tangent_at(c: &CubicBez, t: f64) -> Vec2 {
    c.deriv().eval(t).to_vec2()
}

/// Clamp a bend factor into `[MIN_BEND, MAX_BEND]`; non-finite factors become 1.
pub fn clamp_bend(factor: f64) -> f64 {
    if !factor.is_finite() {
        return 1.0;
    }
    factor.clamp(MIN_BEND, MAX_BEND)
}

/// Scale both control points' offsets from the chord by `factor`.
///
/// The chord runs from the start to the end point; each control point keeps its projection
/// onto the chord and has its normal distance multiplied. Endpoints are untouched.
pub fn apply_bend(c: &CubicBez, factor: f64) -> CubicBez {
    let factor = clamp_bend(factor);
    if (factor - 1.0).abs() < 1e-3 {
        return *c;
    }

    let chord = c.p3 - c.p0;
    let len = chord.hypot();
    let u = if len > 0.0 { chord / len } else { Vec2::new(1.0, 0.0) };
    let n = Vec2::new(-u.y, u.x);

    let bend = |p: Point| {
        let rel = p - c.p0;
        let along = rel.dot(u);
        let normal = rel.dot(n);
        c.p0 + u * along + n * (normal * factor)
    };

    CubicBez::new(c.p0, bend(c.p1), bend(c.p2), c.p3)
}

/// `n + 1` evenly parameterized points, both endpoints included.
///
/// `n` is clamped into `[4, 48]`. Only used for bounds, never for drawing.
pub fn sample_curve(c: &CubicBez, n: usize) -> Vec<Point> {
    let n = n.clamp(MIN_CURVE_SAMPLES, MAX_CURVE_SAMPLES);
    (0..=n).map(|i| c.eval(i as f64 / n as f64)).collect()
}

/// Point at `progress` of the curve's arclength, the SVG `getPointAtLength` equivalent used by
/// the headline marker.
pub fn point_at_length_fraction(c: &CubicBez, progress: f64) -> Point {
    let progress = crate::foundation::math::clamp_unit(progress);
    let total = c.arclen(ARCLEN_ACCURACY);
    if total <= 0.0 {
        return c.p0;
    }
    let t = c.inv_arclen(total * progress, ARCLEN_ACCURACY);
    c.eval(t)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/curve.rs"]
mod tests;
