//! The drawing contract shared by the raster and SVG surfaces.

use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};

/// Logical size plus the true device-pixel size behind it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    pub width: f64,
    pub height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SurfaceInfo {
    /// `width × dpr` rounded to whole device pixels.
    pub fn with_dpr(width: f64, height: f64, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let px = |v: f64| {
            if v.is_finite() && v > 0.0 {
                (v * dpr).round() as u32
            } else {
                0
            }
        };
        Self {
            width,
            height,
            pixel_width: px(width),
            pixel_height: px(height),
        }
    }

    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.pixel_width > 0 && self.pixel_height > 0
    }

    /// Logical-to-device mapping. Independent per axis so fractional ratios round cleanly.
    pub fn device_transform(&self) -> Affine {
        if !self.is_drawable() {
            return Affine::IDENTITY;
        }
        Affine::scale_non_uniform(
            f64::from(self.pixel_width) / self.width,
            f64::from(self.pixel_height) / self.height,
        )
    }
}

/// Named draw groups, in paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Bonds,
    Atoms,
    Dipoles,
    LonePairs,
    Electrons,
    Badge,
}

impl Layer {
    pub fn id(self) -> &'static str {
        match self {
            Self::Background => "mechanism-background",
            Self::Bonds => "mechanism-bonds",
            Self::Atoms => "mechanism-atoms",
            Self::Dipoles => "mechanism-dipoles",
            Self::LonePairs => "mechanism-lone-pairs",
            Self::Electrons => "mechanism-electrons",
            Self::Badge => "mechanism-badge",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub color: Rgba8,
    pub cap: LineCap,
    /// Alternating on/off lengths; empty for a solid stroke.
    pub dash: Vec<f64>,
}

impl StrokeStyle {
    pub fn solid(width: f64, color: Rgba8) -> Self {
        Self {
            width,
            color,
            cap: LineCap::Butt,
            dash: Vec::new(),
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_dash(mut self, dash: &[f64]) -> Self {
        self.dash = dash.to_vec();
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Middle,
    Alphabetic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub weight: u16,
    pub color: Rgba8,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// A drawing target. Coordinates are logical units mapped through the current transform.
pub trait Surface {
    /// `None` when the surface cannot currently be drawn to.
    fn info(&self) -> Option<SurfaceInfo>;

    /// Clear every device pixel, ignoring the current transform.
    fn clear(&mut self);

    fn set_transform(&mut self, transform: Affine);

    fn begin_layer(&mut self, _layer: Layer) {}

    fn end_layer(&mut self) {}

    /// Fill `rect` with a top-to-bottom two-stop gradient.
    fn fill_vertical_gradient(&mut self, rect: Rect, top: Rgba8, bottom: Rgba8);

    fn fill_path(&mut self, path: &BezPath, color: Rgba8);

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8);

    fn stroke_circle(&mut self, center: Point, radius: f64, style: &StrokeStyle);

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);
}
