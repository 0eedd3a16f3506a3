//! Raster surface backed by `vello_cpu`.

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{MechError, MechResult};
use crate::render::backend::FrameRGBA;
use crate::render::surface::{LineCap, StrokeStyle, Surface, SurfaceInfo, TextStyle};
use crate::render::text::TextLayoutEngine;
use kurbo::Shape;
use std::sync::Arc;

const CURVE_TOLERANCE: f64 = 0.05;

pub struct CpuSurface {
    info: SurfaceInfo,
    width_px: u16,
    height_px: u16,
    ctx: vello_cpu::RenderContext,
    /// Current logical transform, before the device scale.
    transform: Affine,
    text: Option<TextLayoutEngine>,
    text_skipped: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("info", &self.info)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// A `width`×`height` logical surface rendered at `dpr` device pixels per unit.
    pub fn new(width: f64, height: f64, dpr: f64) -> MechResult<Self> {
        let info = SurfaceInfo::with_dpr(width, height, dpr);
        let (width_px, height_px) = pixel_dims(&info)?;
        Ok(Self {
            info,
            width_px,
            height_px,
            ctx: vello_cpu::RenderContext::new(width_px.max(1), height_px.max(1)),
            transform: Affine::IDENTITY,
            text: None,
            text_skipped: false,
        })
    }

    /// Labels are only drawn once a font is attached.
    pub fn with_text_engine(mut self, engine: TextLayoutEngine) -> Self {
        self.text = Some(engine);
        self
    }

    pub fn with_font_bytes(self, bytes: Vec<u8>) -> MechResult<Self> {
        Ok(self.with_text_engine(TextLayoutEngine::new(bytes)?))
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Reallocate for a new size. Recorded draws are discarded.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> MechResult<()> {
        let info = SurfaceInfo::with_dpr(width, height, dpr);
        let (w, h) = pixel_dims(&info)?;
        if w != self.width_px || h != self.height_px {
            self.ctx = vello_cpu::RenderContext::new(w.max(1), h.max(1));
        } else {
            self.ctx.reset();
        }
        self.info = info;
        self.width_px = w;
        self.height_px = h;
        Ok(())
    }

    /// Rasterize everything drawn since the last clear.
    pub fn snapshot(&mut self) -> FrameRGBA {
        let mut pixmap = vello_cpu::Pixmap::new(self.width_px.max(1), self.height_px.max(1));
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width_px.max(1)),
            height: u32::from(self.height_px.max(1)),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn apply(&mut self, local: Affine) {
        let device = self.info.device_transform() * self.transform * local;
        self.ctx.set_transform(affine_to_cpu(device));
    }

    fn fill(&mut self, path: &BezPath, color: Rgba8) {
        self.apply(Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }
}

impl Surface for CpuSurface {
    fn info(&self) -> Option<SurfaceInfo> {
        self.info.is_drawable().then_some(self.info)
    }

    fn clear(&mut self) {
        self.ctx.reset();
        self.transform = Affine::IDENTITY;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba8, bottom: Rgba8) {
        // Rasterize the gradient at device resolution and blit it axis-aligned.
        let device = self.info.device_transform() * self.transform;
        let bbox = device.transform_rect_bbox(rect);
        let (w, h) = (bbox.width().ceil(), bbox.height().ceil());
        if !(w >= 1.0 && h >= 1.0) || w > f64::from(u16::MAX) || h > f64::from(u16::MAX) {
            return;
        }
        let Ok(image) = gradient_image(top, bottom, w as u16, h as u16) else {
            return;
        };
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(Vec2::new(bbox.x0, bbox.y0))));
        self.ctx.set_paint(image);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        self.fill(path, color);
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        let outline = stroke_outline(path, style);
        self.fill(&outline, style.color);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let path = kurbo::Circle::new(center, radius).to_path(CURVE_TOLERANCE);
        self.fill(&path, color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, style: &StrokeStyle) {
        let path = kurbo::Circle::new(center, radius).to_path(CURVE_TOLERANCE);
        self.stroke_path(&path, style);
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let Some(engine) = self.text.as_mut() else {
            if !self.text_skipped {
                tracing::debug!("no label font attached; skipping raster text");
                self.text_skipped = true;
            }
            return;
        };
        let shaped = match engine.shape(text, at, style) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, text, "label shaping failed");
                return;
            }
        };
        let font = engine.font().clone();

        self.apply(Affine::translate(shaped.origin));
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn pixel_dims(info: &SurfaceInfo) -> MechResult<(u16, u16)> {
    let w: u16 = info
        .pixel_width
        .try_into()
        .map_err(|_| MechError::render("surface width exceeds u16"))?;
    let h: u16 = info
        .pixel_height
        .try_into()
        .map_err(|_| MechError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

/// Expand a stroke (dashes and caps included) into a fillable outline.
fn stroke_outline(path: &BezPath, style: &StrokeStyle) -> BezPath {
    let cap = match style.cap {
        LineCap::Butt => kurbo::Cap::Butt,
        LineCap::Round => kurbo::Cap::Round,
    };
    let mut stroke = kurbo::Stroke::new(style.width).with_caps(cap);
    if !style.dash.is_empty() {
        stroke = stroke.with_dashes(0.0, style.dash.iter().copied());
    }
    kurbo::stroke(
        path.iter(),
        &stroke,
        &kurbo::StrokeOpts::default(),
        CURVE_TOLERANCE / 4.0,
    )
}

fn gradient_image(top: Rgba8, bottom: Rgba8, w: u16, h: u16) -> MechResult<vello_cpu::Image> {
    let (top, bottom) = (top.premultiplied(), bottom.premultiplied());
    let h1 = f32::from(h.max(1) - 1);
    let mut pixels =
        Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(usize::from(w) * usize::from(h));
    for y in 0..h {
        let t = if h1 <= 0.0 { 0.0 } else { f32::from(y) / h1 };
        let lerp = |a: u8, b: u8| -> u8 {
            let (af, bf) = (f32::from(a), f32::from(b));
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        let px = vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            lerp(top[0], bottom[0]),
            lerp(top[1], bottom[1]),
            lerp(top[2], bottom[2]),
            lerp(top[3], bottom[3]),
        ]);
        pixels.extend(std::iter::repeat_n(px, usize::from(w)));
    }
    let opaque = top[3] == 255 && bottom[3] == 255;
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, !opaque);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
