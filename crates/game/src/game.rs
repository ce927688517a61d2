use crate::context::GameContext;
use crate::error::GameError;
use quarry_input::{Action, InputEvent};
use quarry_kernel::{AppState, PhysicsLoop, PhysicsWorld, SharedSimulation};
use quarry_render::{FramePipeline, FrameSnapshot, RenderBackend, RenderFrame};
use quarry_tick::{TickRate, TickStats};
use quarry_tools::{FrameReport, TickReport};
use std::time::{Duration, Instant};

/// One game session: the render-thread context, the shared simulation and
/// the physics thread driving it.
pub struct Game {
    ctx: GameContext,
    sim: SharedSimulation<PhysicsWorld>,
    tick_rate: TickRate,
    physics: Option<PhysicsLoop>,
    pipeline: FramePipeline,
    overlay: Vec<String>,
    last_frame: Option<FrameReport>,
}

impl Game {
    pub fn new(ctx: GameContext, world: PhysicsWorld) -> Result<Self, GameError> {
        let tick_rate = TickRate::new(ctx.config.tick_rate_hz)?;
        Ok(Self {
            ctx,
            sim: SharedSimulation::new(world),
            tick_rate,
            physics: None,
            pipeline: FramePipeline::new(),
            overlay: Vec::new(),
            last_frame: None,
        })
    }

    /// Restore the saved camera, arm the frame limiter and enter `Run`.
    ///
    /// A missing or unreadable camera record leaves the scene's default view.
    pub fn init(&mut self) {
        let ctx = &mut self.ctx;
        if let Some(state) = ctx.camera_store.restore() {
            ctx.camera.set_state(&state);
        }
        if ctx.config.vsync {
            ctx.limiter.deactivate();
        } else {
            ctx.limiter.activate();
        }
        ctx.clock.reset();
        ctx.app_state.set(AppState::Run);
        tracing::info!(
            fps_limit = ctx.config.fps_limit_hz,
            vsync = ctx.config.vsync,
            "game initialised"
        );
    }

    /// Start the fixed-rate physics thread. A second call is a no-op.
    pub fn start_physics(&mut self) -> Result<(), GameError> {
        if self.physics.is_none() {
            self.physics = Some(PhysicsLoop::spawn(
                self.sim.clone(),
                self.tick_rate.clone(),
                self.ctx.app_state.clone(),
            )?);
        }
        Ok(())
    }

    /// Handle one key event. Returns whether the key is bound.
    pub fn user_input(&mut self, event: InputEvent) -> bool {
        let consumed = self.ctx.keymap.is_bound(event.key);
        if let Some(action) = self.ctx.input.handle(&self.ctx.keymap, event) {
            self.apply(action);
        }
        consumed
    }

    /// Mouse motion in pixels. Returns whether the camera turned.
    pub fn mouse_moved(&mut self, dx: f32, dy: f32) -> bool {
        self.ctx.camera.mouse_moved(dx, dy)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.camera.set_viewport(width, height);
    }

    /// Window focus lost: release held keys so the camera stops.
    pub fn focus_lost(&mut self) {
        self.ctx.input.clear();
    }

    pub fn apply(&mut self, action: Action) {
        let ctx = &mut self.ctx;
        match action {
            Action::Quit => ctx.app_state.request_quit(),
            Action::ToggleWireframe => {
                let on = ctx.settings.toggle_wireframe();
                tracing::info!(on, "wireframe");
            }
            Action::ToggleMouseFollow => {
                let on = ctx.camera.toggle_mouse_follow();
                tracing::info!(on, "mouse follow");
            }
            Action::ToggleBloom => {
                let on = ctx.settings.toggle_bloom();
                tracing::info!(on, "bloom");
            }
            Action::ToggleSsao => {
                let on = ctx.settings.toggle_ssao();
                tracing::info!(on, "SSAO");
            }
            Action::ReloadShaders => {
                ctx.settings.request_shader_reload();
                tracing::info!("shader reload requested");
            }
            Action::ToggleHelpers => {
                let on = ctx.settings.toggle_helpers();
                tracing::info!(on, "helpers");
            }
            Action::SaveCamera => {
                if let Err(e) = ctx.camera_store.save(&ctx.camera.state()) {
                    tracing::warn!("camera not saved: {e}");
                }
            }
        }
    }

    /// Run one frame: advance the camera, snapshot the simulation, render
    /// every pass through `backend`, then wait out the frame limiter.
    pub fn frame<B>(&mut self, backend: &mut B) -> FrameReport
    where
        B: RenderBackend + ?Sized,
    {
        let time = self.ctx.clock.tick();
        self.ctx.limiter.start();
        let busy_from = Instant::now();

        let input = &self.ctx.input;
        self.ctx.camera.update(
            time.dt,
            input.move_axes(),
            input.look_axes(),
            input.sprinting(),
        );

        let snapshot = self.sim.read_locked(FrameSnapshot::capture);
        self.refresh_overlay();

        let frame = RenderFrame {
            camera: &self.ctx.camera,
            scene: &self.ctx.scene,
            snapshot: &snapshot,
            settings: &self.ctx.settings,
            overlay: &self.overlay,
        };
        self.pipeline.render(backend, &frame);

        let cpu_time = busy_from.elapsed();
        let outcome = self.ctx.limiter.wait_for_end();
        if outcome.is_overrun() {
            tracing::trace!(?outcome, "frame over budget");
        }

        let report = FrameReport {
            frame_index: time.frame_index,
            app_time: time.elapsed,
            frame_dt: Duration::from_secs_f32(time.dt),
            cpu_time,
            limiter_hz: self.ctx.limiter.frequency(),
            sim_tick: snapshot.tick,
        };
        self.last_frame = Some(report);
        report
    }

    fn refresh_overlay(&mut self) {
        self.overlay.clear();
        if let Some(frame) = &self.last_frame {
            self.overlay.push(frame.to_string());
        }
        self.overlay.push(format!("physics {}", self.tick_report()));
        let s = &self.ctx.settings;
        self.overlay.push(format!(
            "wireframe={} bloom={} ssao={} helpers={} mouse_follow={}",
            s.wireframe,
            s.bloom,
            s.ssao,
            s.helpers,
            self.ctx.camera.mouse_follow()
        ));
    }

    pub fn should_quit(&self) -> bool {
        self.ctx.app_state.is_quit()
    }

    /// Request quit and join the physics thread. Returns its final stats if
    /// it was running.
    pub fn shutdown(&mut self) -> Result<Option<TickStats>, GameError> {
        self.ctx.app_state.request_quit();
        match self.physics.take() {
            Some(physics) => Ok(Some(physics.join()?)),
            None => Ok(None),
        }
    }

    pub fn tick_report(&self) -> TickReport {
        let stats = self
            .physics
            .as_ref()
            .map(PhysicsLoop::stats)
            .unwrap_or_default();
        TickReport::new(self.tick_rate.hz(), stats)
    }

    pub fn last_frame(&self) -> Option<&FrameReport> {
        self.last_frame.as_ref()
    }

    /// Handle for retuning the physics rate while it runs.
    pub fn tick_rate(&self) -> &TickRate {
        &self.tick_rate
    }

    pub fn simulation(&self) -> &SharedSimulation<PhysicsWorld> {
        &self.sim
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn overlay(&self) -> &[String] {
        &self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::world::demo_world;
    use quarry_common::CameraState;
    use quarry_input::Key;
    use quarry_kernel::Body;
    use quarry_render::{PassKind, TextBackend};
    use std::path::Path;

    fn game_in(dir: &Path) -> Game {
        let config = GameConfig {
            fps_limit_hz: 1000.0,
            ..GameConfig::default()
        }
        .with_data_dir(dir);
        let ctx = GameContext::new(config).unwrap();
        let world = demo_world(&ctx.scene, 3);
        Game::new(ctx, world).unwrap()
    }

    #[test]
    fn escape_requests_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.init();
        assert_eq!(game.context().app_state.get(), AppState::Run);
        assert!(game.user_input(InputEvent::press(Key::Escape)));
        assert!(game.should_quit());
    }

    #[test]
    fn toggles_only_on_press() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.user_input(InputEvent::press(Key::F1));
        game.user_input(InputEvent::release(Key::F1));
        game.user_input(InputEvent::press(Key::Digit1));
        game.user_input(InputEvent::press(Key::Digit2));
        game.user_input(InputEvent::press(Key::F2));
        let ctx = game.context();
        assert!(ctx.settings.wireframe);
        assert!(!ctx.settings.bloom);
        assert!(!ctx.settings.ssao);
        assert!(!ctx.camera.mouse_follow());
    }

    #[test]
    fn f8_saves_camera_and_init_restores_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.context_mut().camera.position = glam::Vec3::new(7.0, 8.0, 9.0);
        assert!(game.user_input(InputEvent::press(Key::F8)));

        let saved = dir.path().join("saves/cameraState.bin");
        assert_eq!(
            std::fs::metadata(&saved).unwrap().len() as usize,
            CameraState::SIZE
        );

        let mut next = game_in(dir.path());
        next.init();
        assert_eq!(
            next.context().camera.position,
            glam::Vec3::new(7.0, 8.0, 9.0)
        );
    }

    #[test]
    fn corrupt_camera_record_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("saves")).unwrap();
        std::fs::write(dir.path().join("saves/cameraState.bin"), [1u8; 3]).unwrap();

        let mut game = game_in(dir.path());
        let before = game.context().camera.position;
        game.init();
        assert_eq!(game.context().camera.position, before);
    }

    #[test]
    fn frame_runs_every_pass_and_moves_camera() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.init();
        game.user_input(InputEvent::press(Key::W));

        let mut backend = TextBackend::new();
        let start = game.context().camera.position;
        game.frame(&mut backend);
        std::thread::sleep(Duration::from_millis(5));
        let report = game.frame(&mut backend);

        assert_eq!(report.frame_index, 2);
        assert_eq!(report.limiter_hz, 1000.0);
        assert_ne!(game.context().camera.position, start);
        assert_eq!(backend.passes().len(), 14);
        assert_eq!(backend.passes()[6], PassKind::Composite);
        assert!(game.overlay().iter().any(|l| l.starts_with("frame=1")));
    }

    #[test]
    fn unbound_key_is_not_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.context_mut().keymap.unbind(Key::F6);
        assert!(!game.user_input(InputEvent::press(Key::F6)));
        assert!(game.context().settings.helpers);
    }

    #[test]
    fn frames_see_physics_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path());
        game.tick_rate().set(200.0).unwrap();
        game.init();
        game.start_physics().unwrap();
        game.start_physics().unwrap();

        std::thread::sleep(Duration::from_millis(60));
        let mut backend = TextBackend::new();
        let report = game.frame(&mut backend);
        assert!(report.sim_tick > 0);

        let stats = game.shutdown().unwrap().unwrap();
        assert!(stats.ticks >= report.sim_tick);
        assert!(game.shutdown().unwrap().is_none());
    }

    #[test]
    fn frame_snapshot_matches_world() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::default().with_data_dir(dir.path());
        let mut world = PhysicsWorld::new();
        world.add_body(Body::at(glam::Vec3::new(0.0, 3.0, 0.0)));
        let mut game = Game::new(GameContext::new(config).unwrap(), world).unwrap();
        game.simulation().update_locked(0.1);

        let mut backend = TextBackend::new();
        assert_eq!(game.frame(&mut backend).sim_tick, 1);
        assert!(backend.take_output().contains("tick=1"));
    }
}
