use crate::foundation::error::{MechError, MechResult};
use crate::render::cpu::CpuSurface;
use crate::render::frame::FrameRenderer;
use crate::render::svg::SvgSurface;
use crate::render::svg_raster::{SvgFonts, rasterize_svg};
use crate::render::text::TextLayoutEngine;
use crate::scene::model::MechanismDefinition;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy, for encoders that expect it.
    pub fn to_straight(&self) -> Self {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    pub fn into_image(self) -> MechResult<image::RgbaImage> {
        let straight = if self.premultiplied {
            self.to_straight()
        } else {
            self
        };
        image::RgbaImage::from_raw(straight.width, straight.height, straight.data)
            .ok_or_else(|| MechError::render("frame byte length does not match its dimensions"))
    }
}

/// Which surface produces the pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// `vello_cpu` raster surface.
    #[default]
    Cpu,
    /// Layered SVG document rasterized through `resvg`.
    Svg,
}

/// Output size and fonts for one-shot frame rendering.
#[derive(Clone, Debug, Default)]
pub struct RasterTarget {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    /// Label font for the raster surface; SVG output also registers it.
    pub font: Option<Vec<u8>>,
}

/// Render one frame to pixels with the chosen backend. `Ok(None)` when the target has no area.
pub fn render_rgba(
    renderer: &mut FrameRenderer,
    def: &MechanismDefinition,
    progress: f64,
    kind: BackendKind,
    target: &RasterTarget,
) -> MechResult<Option<FrameRGBA>> {
    match kind {
        BackendKind::Cpu => {
            let mut surface = CpuSurface::new(target.width, target.height, target.dpr)?;
            if let Some(bytes) = &target.font {
                surface = surface.with_text_engine(TextLayoutEngine::new(bytes.clone())?);
            }
            if renderer.render_frame(def, progress, &mut surface)?.is_none() {
                return Ok(None);
            }
            Ok(Some(surface.snapshot()))
        }
        BackendKind::Svg => {
            let mut surface = SvgSurface::new(target.width, target.height);
            let Some(info) = renderer
                .render_frame(def, progress, &mut surface)?
                .map(|frame| frame.surface)
            else {
                return Ok(None);
            };
            let dpr = if target.dpr.is_finite() && target.dpr > 0.0 {
                target.dpr
            } else {
                1.0
            };
            let fonts = SvgFonts::system().with_font_data(target.font.clone());
            let px = |v: f64| (v * dpr).round().max(1.0) as u32;
            rasterize_svg(&surface.finish(), px(info.width), px(info.height), &fonts).map(Some)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
