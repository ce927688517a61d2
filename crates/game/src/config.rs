use crate::error::ConfigError;
use quarry_persist::DEFAULT_CAMERA_PATH;
use quarry_tick::TickRate;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Quarry".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

/// Session configuration, read from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,

    /// Render-thread frame limiter target.
    #[serde(default = "default_fps_limit")]
    pub fps_limit_hz: f64,

    #[serde(default)]
    pub vsync: bool,

    #[serde(default = "default_camera_path")]
    pub camera_state_path: PathBuf,

    /// Scene description file. The built-in scene is used when unset.
    #[serde(default)]
    pub scene: Option<PathBuf>,

    /// Falling boxes in the demo world.
    #[serde(default = "default_demo_bodies")]
    pub demo_bodies: u32,
}

fn default_tick_rate() -> f64 {
    45.0
}
fn default_fps_limit() -> f64 {
    144.0
}
fn default_camera_path() -> PathBuf {
    PathBuf::from(DEFAULT_CAMERA_PATH)
}
fn default_demo_bodies() -> u32 {
    16
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            tick_rate_hz: default_tick_rate(),
            fps_limit_hz: default_fps_limit(),
            vsync: false,
            camera_state_path: default_camera_path(),
            scene: None,
            demo_bodies: default_demo_bodies(),
        }
    }
}

impl GameConfig {
    /// Load `path`, or the defaults if it does not exist. A file that exists
    /// but cannot be read, parsed or validated is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::info!("config loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        TickRate::new(self.tick_rate_hz)?;
        TickRate::new(self.fps_limit_hz)?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        Ok(())
    }

    /// Resolve relative file paths against `dir`.
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if self.camera_state_path.is_relative() {
            self.camera_state_path = dir.join(&self.camera_state_path);
        }
        if let Some(scene) = self.scene.as_mut().filter(|s| s.is_relative()) {
            *scene = dir.join(&*scene);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_tick::TickError;

    #[test]
    fn defaults() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.tick_rate_hz, 45.0);
        assert_eq!(cfg.fps_limit_hz, 144.0);
        assert!(!cfg.vsync);
        assert_eq!(cfg.camera_state_path, Path::new("saves/cameraState.bin"));
        assert!(cfg.scene.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GameConfig::load_or_default(dir.path().join("quarry.toml")).unwrap();
        assert_eq!(cfg, GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.toml");
        std::fs::write(
            &path,
            "tick_rate_hz = 60.0\nscene = \"scenes/quarry.toml\"\n\n[window]\ntitle = \"Test\"\n",
        )
        .unwrap();

        let cfg = GameConfig::load_or_default(&path).unwrap();
        assert_eq!(cfg.tick_rate_hz, 60.0);
        assert_eq!(cfg.fps_limit_hz, 144.0);
        assert_eq!(cfg.window.title, "Test");
        assert_eq!(cfg.window.width, 1600);
        assert_eq!(cfg.scene.as_deref(), Some(Path::new("scenes/quarry.toml")));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.toml");
        std::fs::write(&path, "tick_rate_hz = \"fast\"").unwrap();
        assert!(matches!(
            GameConfig::load_or_default(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.toml");
        std::fs::write(&path, "tick_rate_hz = 0.0").unwrap();
        assert!(matches!(
            GameConfig::load_or_default(&path),
            Err(ConfigError::Rate(TickError::InvalidFrequency(_)))
        ));

        let cfg = GameConfig {
            fps_limit_hz: -1.0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn data_dir_resolves_relative_paths() {
        let cfg = GameConfig {
            scene: Some(PathBuf::from("scene.toml")),
            ..GameConfig::default()
        }
        .with_data_dir("/data");
        assert_eq!(
            cfg.camera_state_path,
            Path::new("/data/saves/cameraState.bin")
        );
        assert_eq!(cfg.scene.as_deref(), Some(Path::new("/data/scene.toml")));

        let abs = GameConfig {
            camera_state_path: PathBuf::from("/tmp/cam.bin"),
            ..GameConfig::default()
        }
        .with_data_dir("/data");
        assert_eq!(abs.camera_state_path, Path::new("/tmp/cam.bin"));
    }
}
