use crate::eval::timeline::StepCursor;
use crate::foundation::core::Point;
use crate::foundation::error::MechResult;
use crate::layout::fit::FitTransform;
use crate::render::frame::FrameRenderer;
use crate::render::surface::Surface;
use crate::scene::model::MechanismDefinition;
use crate::session::playback::FramePresenter;

/// Owned summary of the last presented frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentedFrame {
    pub progress: f64,
    pub cursor: StepCursor,
    pub fit: Option<FitTransform>,
    pub marker: Point,
}

/// Presents playback progress by drawing frames onto a surface.
#[derive(Debug)]
pub struct SurfacePresenter<S> {
    renderer: FrameRenderer,
    surface: S,
    last: Option<PresentedFrame>,
    frames: u64,
}

impl<S: Surface> SurfacePresenter<S> {
    pub fn new(renderer: FrameRenderer, surface: S) -> Self {
        Self {
            renderer,
            surface,
            last: None,
            frames: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Resizing goes through here; follow it with `PlaybackController::resize`.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Change render options or drop caches between frames.
    pub fn renderer_mut(&mut self) -> &mut FrameRenderer {
        &mut self.renderer
    }

    pub fn last_frame(&self) -> Option<&PresentedFrame> {
        self.last.as_ref()
    }

    /// Frames actually drawn, skipped ones excluded.
    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }
}

impl<S: Surface> FramePresenter for SurfacePresenter<S> {
    fn present(&mut self, def: &MechanismDefinition, progress: f64) -> MechResult<()> {
        let frame = self.renderer.render_frame(def, progress, &mut self.surface)?;
        if let Some(f) = frame {
            self.frames += 1;
            self.last = Some(PresentedFrame {
                progress,
                cursor: f.cursor,
                fit: f.fit,
                marker: f.marker,
            });
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.surface.clear();
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/presenter.rs"]
mod tests;
