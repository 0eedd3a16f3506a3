//! Wall-clock playback and scrubbing over one mechanism timeline.
//!
//! The host drives time: it owns the per-frame callback ([`FrameScheduler`]) and feeds
//! timestamps back through [`PlaybackController::tick`]. At most one frame request is
//! outstanding at any moment; every transition that stops playback cancels it.

use crate::eval::timeline::active_step_index;
use crate::foundation::core::{DEFAULT_DURATION_MS, Point};
use crate::foundation::error::MechResult;
use crate::foundation::math::clamp_unit;
use crate::render::frame::headline_marker;
use crate::scene::model::MechanismDefinition;
use crate::schema::registry::Availability;
use std::sync::Arc;

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;

const DEFAULT_TITLE: &str = "Mechanism animation";
const STEP_PREVIEW: &str = "Mechanism step preview.";
const UNAVAILABLE_TITLE: &str = "Animation unavailable";
const UNAVAILABLE_SUMMARY: &str = "This pathway currently has no playable mechanism asset.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Ready,
    Playing,
    Paused,
    Scrubbing,
    Complete,
    Unavailable,
}

impl PlaybackStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Scrubbing => "Scrubbing",
            Self::Complete => "Complete",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque id of a requested frame callback.
pub type FrameHandle = u64;

/// The host's per-frame callback registration.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Receives every progress change.
pub trait FramePresenter {
    fn present(&mut self, def: &MechanismDefinition, progress: f64) -> MechResult<()>;

    /// Blank the output when nothing is loaded.
    fn clear(&mut self);
}

/// `[0.5, 2]`; non-finite input plays at 1x.
pub fn clamp_speed(multiplier: f64) -> f64 {
    if multiplier.is_finite() {
        multiplier.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    }
}

/// Where the running clock started: timestamp and the progress at that instant.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    start_ms: f64,
    start_progress: f64,
}

#[derive(Debug)]
pub struct PlaybackController<S, P> {
    scheduler: S,
    presenter: P,
    definition: Option<Arc<MechanismDefinition>>,
    status: PlaybackStatus,
    progress: f64,
    speed: f64,
    duration_ms: f64,
    anchor: Option<Anchor>,
    pending: Option<FrameHandle>,
    title: String,
    summary: String,
    step_text: String,
    fallback: Option<String>,
    marker: Point,
}

impl<S: FrameScheduler, P: FramePresenter> PlaybackController<S, P> {
    pub fn new(scheduler: S, presenter: P) -> Self {
        Self {
            scheduler,
            presenter,
            definition: None,
            status: PlaybackStatus::Idle,
            progress: 0.0,
            speed: 1.0,
            duration_ms: f64::from(DEFAULT_DURATION_MS),
            anchor: None,
            pending: None,
            title: String::new(),
            summary: String::new(),
            step_text: String::new(),
            fallback: None,
            marker: default_marker(),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn definition(&self) -> Option<&Arc<MechanismDefinition>> {
        self.definition.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn step_text(&self) -> &str {
        &self.step_text
    }

    /// Message shown instead of the animation, if any.
    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    pub fn marker(&self) -> Point {
        self.marker
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Duration of one full pass at the current speed, never below 1ms.
    pub fn effective_duration_ms(&self) -> f64 {
        (self.duration_ms / self.speed).max(1.0)
    }

    /// Load whatever the registry resolved for a pathway.
    pub fn open(&mut self, availability: &Availability) -> MechResult<()> {
        match availability.definition() {
            Some(def) => self.load(Arc::clone(def)),
            None => {
                let message = availability.message().unwrap_or_default();
                self.show_unavailable(message);
                Ok(())
            }
        }
    }

    /// Make `def` the active mechanism, rewound and drawn at progress 0.
    #[tracing::instrument(skip_all, fields(mechanism = %def.id))]
    pub fn load(&mut self, def: Arc<MechanismDefinition>) -> MechResult<()> {
        self.stop();
        self.fallback = None;
        self.title = non_empty_or(&def.title, DEFAULT_TITLE);
        self.summary = non_empty_or(&def.summary, STEP_PREVIEW);
        self.step_text = def
            .steps
            .first()
            .cloned()
            .unwrap_or_else(|| STEP_PREVIEW.to_owned());
        self.duration_ms = if def.duration_ms > 0 {
            f64::from(def.duration_ms)
        } else {
            f64::from(DEFAULT_DURATION_MS)
        };
        self.definition = Some(def);
        self.set_progress(0.0)?;
        self.status = PlaybackStatus::Ready;
        Ok(())
    }

    pub fn show_unavailable(&mut self, message: &str) {
        self.stop();
        tracing::debug!(message, "mechanism unavailable");
        self.definition = None;
        self.title = UNAVAILABLE_TITLE.to_owned();
        self.summary = UNAVAILABLE_SUMMARY.to_owned();
        self.step_text.clear();
        self.fallback = Some(message.to_owned());
        self.marker = default_marker();
        self.progress = 0.0;
        self.presenter.clear();
        self.status = PlaybackStatus::Unavailable;
    }

    pub fn hide(&mut self) {
        self.stop();
        self.definition = None;
        self.progress = 0.0;
        self.presenter.clear();
        self.status = PlaybackStatus::Idle;
    }

    /// Start the clock at `now_ms`. A finished timeline restarts from 0.
    pub fn play(&mut self, now_ms: f64) {
        if self.definition.is_none() {
            return;
        }
        self.stop();
        if self.progress >= 1.0 {
            self.progress = 0.0;
        }
        self.anchor = Some(Anchor {
            start_ms: now_ms,
            start_progress: self.progress,
        });
        self.status = PlaybackStatus::Playing;
        self.pending = Some(self.scheduler.request_frame());
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.stop();
            self.status = PlaybackStatus::Paused;
        }
    }

    /// The play button: pause while running, otherwise play.
    pub fn toggle(&mut self, now_ms: f64) {
        if self.definition.is_none() {
            return;
        }
        if self.is_running() {
            self.pause();
        } else {
            self.play(now_ms);
        }
    }

    pub fn reset(&mut self) -> MechResult<()> {
        self.stop();
        self.set_progress(0.0)?;
        if self.definition.is_some() {
            self.status = PlaybackStatus::Ready;
        }
        Ok(())
    }

    /// Jump to `ratio` without advancing time.
    pub fn seek(&mut self, ratio: f64) -> MechResult<()> {
        self.stop();
        self.set_progress(ratio)?;
        if self.definition.is_some() {
            self.status = PlaybackStatus::Scrubbing;
        }
        Ok(())
    }

    /// Change speed. While running, the clock is re-based at the current progress so the
    /// marker does not jump.
    pub fn set_speed(&mut self, multiplier: f64, now_ms: f64) {
        self.speed = clamp_speed(multiplier);
        if self.anchor.is_some() {
            self.anchor = Some(Anchor {
                start_ms: now_ms,
                start_progress: self.progress,
            });
        }
    }

    /// Frame callback. Stale or cancelled handles are ignored.
    pub fn tick(&mut self, handle: FrameHandle, now_ms: f64) -> MechResult<()> {
        let Some(anchor) = self.anchor else {
            return Ok(());
        };
        if self.pending != Some(handle) {
            tracing::debug!(handle, "stale frame callback ignored");
            return Ok(());
        }
        self.pending = None;

        let elapsed = (now_ms - anchor.start_ms).max(0.0);
        let next = (anchor.start_progress + elapsed / self.effective_duration_ms()).min(1.0);
        if let Err(e) = self.set_progress(next) {
            self.stop();
            return Err(e);
        }
        if next >= 1.0 {
            self.stop();
            self.status = PlaybackStatus::Complete;
        } else {
            self.pending = Some(self.scheduler.request_frame());
        }
        Ok(())
    }

    /// Redraw the current progress after the output changed size.
    pub fn resize(&mut self) -> MechResult<()> {
        match &self.definition {
            Some(def) => self.presenter.present(def, self.progress),
            None => Ok(()),
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.anchor = None;
    }

    fn set_progress(&mut self, ratio: f64) -> MechResult<()> {
        self.progress = clamp_unit(ratio);
        let Some(def) = &self.definition else {
            return Ok(());
        };
        let step = active_step_index(def.step_count(), self.progress);
        self.step_text = def
            .step_text(step)
            .filter(|s| !s.is_empty())
            .unwrap_or(STEP_PREVIEW)
            .to_owned();
        self.marker = headline_marker(def, self.progress);
        self.presenter.present(def, self.progress)
    }
}

fn non_empty_or(s: &str, fallback: &str) -> String {
    if s.trim().is_empty() {
        fallback.to_owned()
    } else {
        s.to_owned()
    }
}

/// Start of the default headline path.
fn default_marker() -> Point {
    Point::new(24.0, 84.0)
}

#[cfg(test)]
#[path = "../../tests/unit/session/playback.rs"]
mod tests;
