//! Frame rendering onto raster and SVG surfaces.

pub mod backend;
pub mod cpu;
pub(crate) mod cues;
pub mod frame;
pub mod style;
pub mod surface;
pub mod svg;
pub mod svg_raster;
pub mod text;

pub use cues::arrow_head_t;

#[cfg(test)]
#[path = "../../tests/unit/render/support.rs"]
pub(crate) mod support;
