//! Interactive playback: the wall-clock controller and the surface it presents to.

pub mod playback;
pub mod presenter;

pub use playback::{
    FrameHandle, FramePresenter, FrameScheduler, PlaybackController, PlaybackStatus, clamp_speed,
};
pub use presenter::{PresentedFrame, SurfacePresenter};
