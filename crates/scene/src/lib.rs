//! Scene assembly.
//!
//! A [`SceneDescription`] is plain data. The defaults describe the shipped
//! quarry scene; a TOML file can override any subset of fields.
//!
//! # Invariants
//! - A description returned by [`SceneDescription::load`] has passed
//!   [`SceneDescription::validate`].

mod description;
mod error;

pub use description::{
    CameraProjection, SceneDescription, SkyboxDesc, SunDesc, TerrainDesc, TerrainLayer,
    TessellationDesc, TextureSlot, TERRAIN_COLOR_SLOT_BASE, TERRAIN_NORMAL_SLOT_BASE,
};
pub use error::SceneError;
