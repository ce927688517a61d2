use crate::config::GameConfig;
use crate::error::GameError;
use quarry_input::{InputState, KeyMap};
use quarry_kernel::AppStateFlag;
use quarry_persist::CameraStore;
use quarry_render::{FlyCamera, RenderSettings};
use quarry_scene::SceneDescription;
use quarry_tick::{FrameClock, TickScheduler};

/// Render-thread state for one session.
pub struct GameContext {
    pub config: GameConfig,
    pub scene: SceneDescription,
    pub camera: FlyCamera,
    pub clock: FrameClock,
    /// Frame limiter. Inactive when vsync paces the frames instead.
    pub limiter: TickScheduler,
    pub settings: RenderSettings,
    pub app_state: AppStateFlag,
    pub input: InputState,
    pub keymap: KeyMap,
    pub camera_store: CameraStore,
}

impl GameContext {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let scene = match &config.scene {
            Some(path) => SceneDescription::load(path)?,
            None => SceneDescription::default(),
        };
        Ok(Self {
            camera: FlyCamera::with_projection(&scene.camera),
            limiter: TickScheduler::new(config.fps_limit_hz)?,
            camera_store: CameraStore::new(&config.camera_state_path),
            clock: FrameClock::new(),
            settings: RenderSettings::default(),
            app_state: AppStateFlag::new(),
            input: InputState::new(),
            keymap: KeyMap::default(),
            scene,
            config,
        })
    }
}
