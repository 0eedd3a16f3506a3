//! Palette and metrics for every cue, in world units.

use crate::foundation::core::Rgba8;
use crate::render::surface::{TextAlign, TextBaseline, TextStyle};

pub const BACKGROUND_TOP: Rgba8 = Rgba8::rgb(0x02, 0x06, 0x17);
pub const BACKGROUND_BOTTOM: Rgba8 = Rgba8::rgb(0x0f, 0x17, 0x2a);

pub const BOND_COLOR: Rgba8 = Rgba8::rgb(0x94, 0xa3, 0xb8);
pub const BOND_WIDTH: f64 = 2.3;
/// Perpendicular spacing unit between the strokes of a multiple bond.
pub const BOND_OFFSET: f64 = 2.4;
pub const BOND_MULTI_OFFSETS: [f64; 2] = [-0.7, 0.7];

pub const ATOM_RADIUS: f64 = 8.5;
pub const ATOM_SHADOW_DY: f64 = 1.5;
pub const ATOM_OUTLINE_WIDTH: f64 = 1.0;
pub const ATOM_LABEL_DY: f64 = 0.5;

pub fn atom_shadow() -> Rgba8 {
    Rgba8::rgba(15, 23, 42, 0.45)
}

pub fn atom_outline() -> Rgba8 {
    Rgba8::rgba(203, 213, 225, 0.85)
}

pub const DIPOLE_COLOR: Rgba8 = Rgba8::rgb(0xfb, 0x71, 0x85);

pub const LONE_PAIR_DOT: Rgba8 = Rgba8::rgb(0x60, 0xa5, 0xfa);
pub const LONE_PAIR_LABEL: Rgba8 = Rgba8::rgb(0x93, 0xc5, 0xfd);
pub const LONE_PAIR_DOT_RADIUS: f64 = 1.3;
pub const LONE_PAIR_DX: f64 = 2.4;
pub const LONE_PAIR_DY: f64 = 1.4;
pub const LONE_PAIR_LABEL_DY: f64 = -6.0;

pub const ARROW_STROKE: Rgba8 = Rgba8::rgb(0xf5, 0x9e, 0x0b);
pub const ARROW_HEAD: Rgba8 = Rgba8::rgb(0xfb, 0xbf, 0x24);
pub const ELECTRON_DOT: Rgba8 = Rgba8::rgb(0xfd, 0xe6, 0x8a);
pub const ARROW_WIDTH: f64 = 2.0;
pub const ARROW_DASH: [f64; 2] = [5.0, 3.0];
pub const ARROW_HEAD_SIZE: f64 = 7.0;
pub const ELECTRON_RADIUS: f64 = 2.2;
/// The electron trails the arrowhead by this much curve parameter.
pub const ELECTRON_LAG: f64 = 0.08;
/// Arrow labels stack upward from here, one row per arrow in the step.
pub const ARROW_LABEL_ORIGIN: (f64, f64) = (180.0, 156.0);
pub const ARROW_LABEL_ROW: f64 = 11.0;

pub const BADGE_ORIGIN: (f64, f64) = (10.0, 12.0);

pub fn badge_color() -> Rgba8 {
    Rgba8::rgba(148, 163, 184, 0.9)
}

/// Fill and label colors picked from the element symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtomStyle {
    pub fill: Rgba8,
    pub text: Rgba8,
}

/// `Br` is tested before `B`, so bromine never reads as boron.
pub fn atom_style(label: &str) -> AtomStyle {
    const WHITE: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
    let label = label.trim();
    let (fill, text) = if label.starts_with("Br") {
        (Rgba8::rgb(0x7f, 0x1d, 0x1d), WHITE)
    } else if label.starts_with('O') {
        (Rgba8::rgb(0x0f, 0x76, 0x6e), WHITE)
    } else if label.starts_with('H') {
        (Rgba8::rgb(0xf8, 0xfa, 0xfc), Rgba8::rgb(0x1e, 0x29, 0x3b))
    } else if label.starts_with('B') {
        (Rgba8::rgb(0x1e, 0x40, 0xaf), WHITE)
    } else {
        (Rgba8::rgb(0x33, 0x41, 0x55), WHITE)
    };
    AtomStyle { fill, text }
}

pub fn label_text(color: Rgba8) -> TextStyle {
    TextStyle {
        size: 8.0,
        weight: 600,
        color,
        align: TextAlign::Center,
        baseline: TextBaseline::Middle,
    }
}

pub fn dipole_text() -> TextStyle {
    TextStyle {
        size: 9.0,
        weight: 700,
        ..label_text(DIPOLE_COLOR)
    }
}

pub fn lone_pair_text() -> TextStyle {
    TextStyle {
        baseline: TextBaseline::Alphabetic,
        ..label_text(LONE_PAIR_LABEL)
    }
}

pub fn badge_text() -> TextStyle {
    TextStyle {
        align: TextAlign::Left,
        ..label_text(badge_color())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
