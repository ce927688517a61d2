//! Shared types used across the quarry crates.

pub mod types;

pub use types::{BodyId, CameraState, Transform};
