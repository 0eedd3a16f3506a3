//! Mechviz plays step-indexed organic-chemistry mechanism animations.
//!
//! Curated mechanism JSON is sanitized into a [`MechanismRegistry`], resolved into the scene
//! visible at a progress ratio, and drawn through a [`Surface`]:
//!
//! - Build a registry from links and overrides ([`MechanismRegistry::build`])
//! - Render frames with a [`FrameRenderer`] onto a [`CpuSurface`] or an [`SvgSurface`]
//! - Drive playback over time with a [`PlaybackController`]
#![forbid(unsafe_code)]

pub mod eval;
pub mod foundation;
pub mod geometry;
pub mod layout;
/// Frame rendering and output surfaces.
pub mod render;
/// Mechanism data model.
pub mod scene;
pub mod schema;
pub mod session;
pub mod validate;

pub use crate::foundation::core::{Affine, BezPath, CubicBez, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{MechError, MechResult};

pub use crate::eval::scene::{ResolvedScene, SceneOptions, resolve_scene};
pub use crate::eval::timeline::{StepCursor, active_step_index, step_cursor};
pub use crate::layout::cache::FitCache;
pub use crate::layout::fit::{FitOptions, FitScope, FitTransform};
pub use crate::layout::viewport::{ViewportTransform, fit_contain};
pub use crate::render::backend::{BackendKind, FrameRGBA, RasterTarget, render_rgba};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::{FrameInfo, FrameRenderer, RenderOptions};
pub use crate::render::surface::{Surface, SurfaceInfo};
pub use crate::render::svg::SvgSurface;
pub use crate::scene::model::MechanismDefinition;
pub use crate::schema::overrides::OverrideTable;
pub use crate::schema::registry::{Availability, LinkDataset, MechanismRegistry};
pub use crate::session::{PlaybackController, PlaybackStatus, SurfacePresenter};
pub use crate::validate::{MechanismValidator, ValidationGate, validate_definition, validate_mechanism};
