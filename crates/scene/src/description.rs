use crate::error::SceneError;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// First texture slot used for terrain colour layers.
pub const TERRAIN_COLOR_SLOT_BASE: u32 = 4;
/// First texture slot used for terrain normal layers.
pub const TERRAIN_NORMAL_SLOT_BASE: u32 = 8;

const MAX_TERRAIN_LAYERS: usize = (TERRAIN_NORMAL_SLOT_BASE - TERRAIN_COLOR_SLOT_BASE) as usize;

/// Everything needed to assemble the 3D scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub ambient_light: Vec3,
    pub skybox: SkyboxDesc,
    pub terrain: TerrainDesc,
    pub sun: SunDesc,
    pub camera: CameraProjection,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            ambient_light: Vec3::splat(0.1),
            skybox: SkyboxDesc::default(),
            terrain: TerrainDesc::default(),
            sun: SunDesc::default(),
            camera: CameraProjection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxDesc {
    pub folder: PathBuf,
    /// Environment texture sampled for reflections in the forward pass.
    pub reflection_texture: PathBuf,
    pub scale: f32,
    pub depth_write: bool,
}

impl Default for SkyboxDesc {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("ressources/models/skybox"),
            reflection_texture: PathBuf::from("ressources/models/skybox/quarry_cloudy_2k.jpg"),
            scale: 1e6,
            depth_write: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainLayer {
    pub name: String,
}

impl TerrainLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A texture bound to a numbered material slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub slot: u32,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationDesc {
    /// Min/max subdivision level.
    pub levels: Vec2,
    /// Camera distances at which the max and min levels apply.
    pub distances: Vec2,
    /// Displacement strength and texture-space scale.
    pub displacement: Vec2,
    pub height_factors: Vec2,
}

impl Default for TessellationDesc {
    fn default() -> Self {
        Self {
            levels: Vec2::new(1.0, 12.0),
            distances: Vec2::new(10.0, 150.0),
            displacement: Vec2::new(30.0, 0.005),
            height_factors: Vec2::new(1.0, 2.0),
        }
    }
}

impl TessellationDesc {
    /// Subdivision level for a patch `distance` away from the camera.
    /// Linear between the two distances, clamped outside them.
    pub fn level_at(&self, distance: f32) -> f32 {
        let span = self.distances.y - self.distances.x;
        if span <= 0.0 {
            return self.levels.y;
        }
        let t = ((distance - self.distances.x) / span).clamp(0.0, 1.0);
        self.levels.y + (self.levels.x - self.levels.y) * t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainDesc {
    pub mesh: PathBuf,
    pub height_map: PathBuf,
    pub height_map_slot: u32,
    pub texture_dir: PathBuf,
    pub layers: Vec<TerrainLayer>,
    pub position: Vec3,
    pub scale: f32,
    pub tessellation: TessellationDesc,
}

impl Default for TerrainDesc {
    fn default() -> Self {
        Self {
            mesh: PathBuf::from("ressources/models/ground/model.obj"),
            height_map: PathBuf::from("ressources/maps/RuggedTerrain.hdr"),
            height_map_slot: 2,
            texture_dir: PathBuf::from("ressources/models/terrain"),
            layers: ["snowdrift1_ue", "limestone5-bl", "leafy-grass2-bl", "forest-floor-bl-1"]
                .into_iter()
                .map(TerrainLayer::new)
                .collect(),
            position: Vec3::new(0.0, 30.0, 0.0),
            scale: 100.0,
            tessellation: TessellationDesc::default(),
        }
    }
}

impl TerrainDesc {
    /// Height map, then each layer's colour (`{name}CE.ktx2`) and normal
    /// (`{name}NRM.ktx2`) texture, in slot order.
    pub fn texture_slots(&self) -> Vec<TextureSlot> {
        let mut slots = vec![TextureSlot {
            slot: self.height_map_slot,
            path: self.height_map.clone(),
        }];
        for (i, layer) in (0u32..).zip(&self.layers) {
            slots.push(TextureSlot {
                slot: TERRAIN_COLOR_SLOT_BASE + i,
                path: self.texture_dir.join(format!("{}CE.ktx2", layer.name)),
            });
        }
        for (i, layer) in (0u32..).zip(&self.layers) {
            slots.push(TextureSlot {
                slot: TERRAIN_NORMAL_SLOT_BASE + i,
                path: self.texture_dir.join(format!("{}NRM.ktx2", layer.name)),
            });
        }
        slots
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunDesc {
    pub color: Vec3,
    /// Direction the light travels. Normalised on use.
    pub direction: Vec3,
    pub intensity: f32,
    pub shadow_resolution: u32,
    /// World-space width and height covered by the shadow map.
    pub shadow_extent: Vec2,
    pub shadows: bool,
}

impl Default for SunDesc {
    fn default() -> Self {
        Self {
            color: Vec3::new(143.0, 107.0, 71.0) / 255.0,
            direction: Vec3::new(-1.0, -1.0, 0.0),
            intensity: 1.0,
            shadow_resolution: 6144,
            shadow_extent: Vec2::splat(300.0),
            shadows: false,
        }
    }
}

impl SunDesc {
    pub fn direction_normalized(&self) -> Vec3 {
        self.direction.normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProjection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.1,
            far: 1e4,
        }
    }
}

impl CameraProjection {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Perspective matrix with depth 1 at `near` and 0 at `far`.
    pub fn reversed_z(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), aspect, self.far, self.near)
    }
}

impl SceneDescription {
    /// Read, parse and validate a TOML scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene: Self = toml::from_str(&text).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        scene.validate()?;
        tracing::info!(
            "scene loaded from {} ({} terrain layers)",
            path.display(),
            scene.terrain.layers.len()
        );
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |msg: String| Err(SceneError::Invalid(msg));

        let dir = self.sun.direction;
        if !dir.is_finite() || dir.length_squared() < 1e-12 {
            return invalid(format!("sun direction {dir} has no length"));
        }
        if !(self.sun.intensity.is_finite() && self.sun.intensity >= 0.0) {
            return invalid(format!("sun intensity {} is negative", self.sun.intensity));
        }
        if self.sun.shadow_resolution == 0 {
            return invalid("sun shadow resolution is zero".into());
        }
        if !(self.terrain.scale > 0.0) {
            return invalid(format!("terrain scale {} is not positive", self.terrain.scale));
        }
        if !(self.skybox.scale > 0.0) {
            return invalid(format!("skybox scale {} is not positive", self.skybox.scale));
        }
        if self.terrain.layers.len() > MAX_TERRAIN_LAYERS {
            return invalid(format!(
                "{} terrain layers, at most {MAX_TERRAIN_LAYERS} fit between slots",
                self.terrain.layers.len()
            ));
        }
        let cam = &self.camera;
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return invalid(format!("camera near {} must be in (0, far {})", cam.near, cam.far));
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return invalid(format!("camera fov {} out of range", cam.fov_degrees));
        }
        Ok(())
    }
}
