//! Label shaping for the raster surface.

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{MechError, MechResult};
use crate::render::surface::{TextAlign, TextBaseline, TextStyle};

/// Brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A shaped single-line label and the offset that anchors it at the requested point.
pub struct ShapedLabel {
    pub layout: parley::Layout<TextBrushRgba8>,
    /// Translation from the anchor to the layout's top-left corner.
    pub origin: Vec2,
}

/// Parley contexts plus one registered font, reused across frames.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("family_name", &self.family_name)
            .finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    /// Register `font_bytes` (TTF/OTF) as the only family used for labels.
    pub fn new(font_bytes: Vec<u8>) -> MechResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MechError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MechError::render("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family_name, "label font registered");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    pub fn from_path(path: &std::path::Path) -> MechResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            MechError::render(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::new(bytes)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` and compute where it must sit so `anchor` lands on the requested
    /// alignment point.
    pub fn shape(&mut self, text: &str, anchor: Point, style: &TextStyle) -> MechResult<ShapedLabel> {
        let size = style.size as f32;
        if !size.is_finite() || size <= 0.0 {
            return Err(MechError::render("text size must be finite and > 0"));
        }
        let brush = TextBrushRgba8 {
            r: style.color.r,
            g: style.color.g,
            b: style.color.b,
            a: style.color.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (f64::from(m.baseline), f64::from(m.ascent), f64::from(m.descent))
            })
            .unwrap_or_default();

        let dx = match style.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -f64::from(layout.width()) / 2.0,
        };
        let dy = match style.baseline {
            TextBaseline::Alphabetic => -baseline,
            // Center of the ascent/descent box sits on the anchor.
            TextBaseline::Middle => -(baseline - (ascent - descent) / 2.0),
        };

        Ok(ShapedLabel {
            layout,
            origin: anchor.to_vec2() + Vec2::new(dx, dy),
        })
    }
}
