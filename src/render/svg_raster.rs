use crate::foundation::error::{MechError, MechResult};
use crate::render::backend::FrameRGBA;
use std::sync::Arc;

/// Largest raster edge accepted for an SVG frame.
const MAX_DIM: u32 = 16_384;

/// Font database used when parsing emitted SVG text.
#[derive(Clone)]
pub struct SvgFonts {
    db: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgFonts")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl Default for SvgFonts {
    fn default() -> Self {
        Self::system()
    }
}

impl SvgFonts {
    pub fn system() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self { db: Arc::new(db) }
    }

    /// An empty database; `<text>` elements render nothing.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Also register an explicit font so labels render without system fonts.
    pub fn with_font_data(mut self, bytes: Option<Vec<u8>>) -> Self {
        if let Some(bytes) = bytes {
            Arc::make_mut(&mut self.db).load_font_data(bytes);
        }
        self
    }

    pub fn face_count(&self) -> usize {
        self.db.faces().count()
    }
}

pub fn parse_svg(svg: &str, fonts: &SvgFonts) -> MechResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb: Arc::clone(&fonts.db),
        ..Default::default()
    };
    usvg::Tree::from_str(svg, &opts).map_err(|e| MechError::render(format!("parse svg: {e}")))
}

/// Rasterize an SVG document into a `width`×`height` premultiplied frame, scaling its
/// viewport to fit.
pub fn rasterize_svg(svg: &str, width: u32, height: u32, fonts: &SvgFonts) -> MechResult<FrameRGBA> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(MechError::render(format!(
            "svg raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let tree = parse_svg(svg, fonts)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MechError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.data().to_vec(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg_raster.rs"]
mod tests;
