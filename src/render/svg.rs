//! Layered SVG surface: the DOM twin of the raster surface.
//!
//! Each [`Layer`] becomes a `<g id="mechanism-…">` group and every draw call becomes one
//! element carrying the current transform, so the document mirrors the raster output call for
//! call.

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::render::surface::{
    Layer, LineCap, StrokeStyle, Surface, SurfaceInfo, TextAlign, TextBaseline, TextStyle,
};
use std::fmt::Write as _;

const FONT_FAMILY: &str = "Segoe UI, sans-serif";

#[derive(Clone, Debug)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    transform: Affine,
    body: String,
    open_layers: Vec<Layer>,
    gradients: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            transform: Affine::IDENTITY,
            body: String::new(),
            open_layers: Vec::new(),
            gradients: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// The complete document, closing any layer left open.
    pub fn finish(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height),
        );
        out.push_str(&self.body);
        for _ in &self.open_layers {
            out.push_str("</g>");
        }
        out.push_str("</svg>");
        out
    }

    fn transform_attr(&self) -> String {
        if self.transform == Affine::IDENTITY {
            return String::new();
        }
        let [a, b, c, d, e, f] = self.transform.as_coeffs();
        format!(
            r#" transform="matrix({} {} {} {} {} {})""#,
            num(a),
            num(b),
            num(c),
            num(d),
            num(e),
            num(f)
        )
    }

    fn stroke_attrs(style: &StrokeStyle) -> String {
        let mut s = format!(
            r#" fill="none" stroke="{}"{} stroke-width="{}""#,
            style.color.to_hex(),
            opacity_attr("stroke-opacity", style.color),
            num(style.width)
        );
        if style.cap == LineCap::Round {
            s.push_str(r#" stroke-linecap="round""#);
        }
        if !style.dash.is_empty() {
            let dash: Vec<String> = style.dash.iter().map(|v| num(*v)).collect();
            let _ = write!(s, r#" stroke-dasharray="{}""#, dash.join(" "));
        }
        s
    }
}

impl Surface for SvgSurface {
    fn info(&self) -> Option<SurfaceInfo> {
        let info = SurfaceInfo::with_dpr(self.width, self.height, 1.0);
        info.is_drawable().then_some(info)
    }

    fn clear(&mut self) {
        self.body.clear();
        self.open_layers.clear();
        self.transform = Affine::IDENTITY;
        self.gradients = 0;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn begin_layer(&mut self, layer: Layer) {
        let _ = write!(self.body, r#"<g id="{}">"#, layer.id());
        self.open_layers.push(layer);
    }

    fn end_layer(&mut self) {
        if self.open_layers.pop().is_some() {
            self.body.push_str("</g>");
        }
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba8, bottom: Rgba8) {
        let id = format!("mechanism-gradient-{}", self.gradients);
        self.gradients += 1;
        let stop = |offset: &str, c: Rgba8| {
            format!(
                r#"<stop offset="{offset}" stop-color="{}"{}/>"#,
                c.to_hex(),
                opacity_attr("stop-opacity", c)
            )
        };
        let _ = write!(
            self.body,
            r#"<defs><linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="0" y1="{}" x2="0" y2="{}">{}{}</linearGradient></defs>"#,
            num(rect.y0),
            num(rect.y1),
            stop("0", top),
            stop("1", bottom),
        );
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#{id})"{}/>"#,
            num(rect.x0),
            num(rect.y0),
            num(rect.width()),
            num(rect.height()),
            self.transform_attr()
        );
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        let _ = write!(
            self.body,
            r#"<path d="{}" fill="{}"{}{}/>"#,
            path.to_svg(),
            color.to_hex(),
            opacity_attr("fill-opacity", color),
            self.transform_attr()
        );
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        let _ = write!(
            self.body,
            r#"<path d="{}"{}{}/>"#,
            path.to_svg(),
            Self::stroke_attrs(style),
            self.transform_attr()
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"{}{}/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            color.to_hex(),
            opacity_attr("fill-opacity", color),
            self.transform_attr()
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, style: &StrokeStyle) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}"{}{}/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            Self::stroke_attrs(style),
            self.transform_attr()
        );
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let anchor = match style.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
        };
        let baseline = match style.baseline {
            TextBaseline::Middle => r#" dominant-baseline="middle""#,
            TextBaseline::Alphabetic => "",
        };
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" font-weight="{}" fill="{}"{} text-anchor="{anchor}"{baseline}{}>{}</text>"#,
            num(at.x),
            num(at.y),
            num(style.size),
            style.weight,
            style.color.to_hex(),
            opacity_attr("fill-opacity", style.color),
            self.transform_attr(),
            escape_xml(text)
        );
    }
}

fn opacity_attr(name: &str, c: Rgba8) -> String {
    if c.a == 255 {
        String::new()
    } else {
        format!(r#" {name}="{}""#, num(c.alpha_f64()))
    }
}

/// Up to four decimals, trailing zeros trimmed.
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
