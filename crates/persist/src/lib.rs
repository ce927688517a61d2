//! Persistence for state that outlives a session.
//!
//! # Invariants
//! - Records are written whole: a temp file is renamed over the target.
//! - A missing or unreadable record is never fatal to the caller; use
//!   [`CameraStore::restore`] to fall back to defaults.

mod camera;
mod error;

pub use camera::{CameraStore, DEFAULT_CAMERA_PATH};
pub use error::PersistError;
