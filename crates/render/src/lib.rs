//! Rendering adapter: a fixed per-frame pass order over a pluggable backend.
//!
//! # Invariants
//! - Backends never see the simulation lock. They draw from a
//!   [`FrameSnapshot`] captured under it.
//! - Pass order is fixed: UI 2D, shadow maps, depth pre-pass, forward, SSAO,
//!   bloom, composite. Disabled post effects are skipped, never reordered.

mod camera;
mod frame;
mod pipeline;
mod text;

pub use camera::FlyCamera;
pub use frame::{BodyInstance, FrameSnapshot, RenderFrame, RenderSettings};
pub use pipeline::{FramePipeline, PassKind, RenderBackend};
pub use text::TextBackend;
