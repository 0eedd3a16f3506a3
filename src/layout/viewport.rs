use crate::foundation::core::{Affine, Vec2};

/// Surface-to-world mapping. Uniform and centered unless stretched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn is_uniform(&self) -> bool {
        (self.scale_x - self.scale_y).abs() < 1e-9
    }

    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.offset_x, self.offset_y))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// Letterboxed placement of a `world_w`x`world_h` box inside a `w`x`h` area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainFit {
    pub scale: f64,
    pub draw_w: f64,
    pub draw_h: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

pub fn fit_contain(w: f64, h: f64, world_w: f64, world_h: f64) -> ContainFit {
    let (w, h) = (finite_non_negative(w), finite_non_negative(h));
    if !(world_w > 0.0 && world_h > 0.0 && world_w.is_finite() && world_h.is_finite()) {
        return ContainFit {
            scale: 0.0,
            draw_w: 0.0,
            draw_h: 0.0,
            offset_x: w / 2.0,
            offset_y: h / 2.0,
        };
    }
    let scale = (w / world_w).min(h / world_h);
    let draw_w = world_w * scale;
    let draw_h = world_h * scale;
    ContainFit {
        scale,
        draw_w,
        draw_h,
        offset_x: (w - draw_w) / 2.0,
        offset_y: (h - draw_h) / 2.0,
    }
}

/// Map the logical world onto a `surface_w`x`surface_h` surface.
pub fn resolve_viewport_transform(
    surface_w: f64,
    surface_h: f64,
    world_w: f64,
    world_h: f64,
    stretch: bool,
) -> ViewportTransform {
    if stretch && world_w > 0.0 && world_h > 0.0 {
        return ViewportTransform {
            scale_x: finite_non_negative(surface_w) / world_w,
            scale_y: finite_non_negative(surface_h) / world_h,
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }
    let fit = fit_contain(surface_w, surface_h, world_w, world_h);
    ViewportTransform {
        scale_x: fit.scale,
        scale_y: fit.scale,
        offset_x: fit.offset_x,
        offset_y: fit.offset_y,
    }
}

fn finite_non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/viewport.rs"]
mod tests;
