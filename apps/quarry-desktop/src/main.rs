use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use quarry_game::{Game, GameConfig, GameContext, demo_world};
use quarry_input::{Action, InputEvent, Key};
use quarry_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "quarry-desktop", about = "Quarry desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config, relative to the data directory
    #[arg(long, default_value = "quarry.toml")]
    config: PathBuf,

    /// Directory that config, scene and save paths are resolved against
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F8 => Key::F8,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => return None,
    })
}

/// Window, surface and everything that draws into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, game: &Game, egui_ctx: &EguiContext) -> Result<Self> {
        let cfg = &game.context().config;
        let attrs = Window::default_attributes()
            .with_title(cfg.window.title.clone())
            .with_inner_size(PhysicalSize::new(cfg.window.width, cfg.window.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("quarry_device"),
                required_features: WgpuRenderer::optional_features() & adapter.features(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let present_mode = if cfg.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?present_mode,
            "GPU initialised"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn sync_cursor(&self, follow: bool) {
        if follow {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::debug!("cursor grab unavailable: {e}");
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::debug!("cursor release failed: {e}");
        }
        self.window.set_cursor_visible(!follow);
    }
}

struct GpuApp {
    game: Game,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    show_debug: bool,
    error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(game: Game) -> Self {
        Self {
            game,
            gpu: None,
            egui_ctx: EguiContext::default(),
            show_debug: true,
            error: None,
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        let Some(key) = map_key(code) else {
            return;
        };
        let follow_before = self.game.context().camera.mouse_follow();
        let event = if pressed {
            InputEvent::press(key)
        } else {
            InputEvent::release(key)
        };
        self.game.user_input(event);

        let follow = self.game.context().camera.mouse_follow();
        if follow != follow_before {
            if let Some(gpu) = &self.gpu {
                gpu.sync_cursor(follow);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        {
            let mut frame = gpu.renderer.begin_frame(&gpu.device, &gpu.queue, &view);
            self.game.frame(&mut frame);
            frame.submit();
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let mut actions = Vec::new();
        let mut new_rate = None;
        let show_debug = self.show_debug;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_debug {
                debug_panel(ctx, &self.game, &mut actions, &mut new_rate);
            }
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }
        output.present();

        if let Some(hz) = new_rate {
            if let Err(e) = self.game.tick_rate().set(hz) {
                tracing::warn!("physics rate unchanged: {e}");
            }
        }
        let follow_before = self.game.context().camera.mouse_follow();
        for action in actions {
            self.game.apply(action);
        }
        let follow = self.game.context().camera.mouse_follow();
        if follow != follow_before {
            if let Some(gpu) = &self.gpu {
                gpu.sync_cursor(follow);
            }
        }

        if self.game.should_quit() {
            event_loop.exit();
        }
    }
}

/// Physics rate slider. The configured rate may lie outside the drag range,
/// so the value is never clamped; returns whether the user moved it.
fn rate_slider(ui: &mut egui::Ui, hz: &mut f64) -> bool {
    ui.add(
        egui::Slider::new(hz, 1.0..=240.0)
            .clamping(egui::SliderClamping::Never)
            .text("physics Hz"),
    )
    .changed()
}

fn debug_panel(
    ctx: &EguiContext,
    game: &Game,
    actions: &mut Vec<Action>,
    new_rate: &mut Option<f64>,
) {
    egui::Window::new("Debug")
        .default_width(360.0)
        .show(ctx, |ui| {
            for line in game.overlay() {
                ui.monospace(line);
            }
            ui.separator();

            ui.label(format!("physics {}", game.tick_report()));
            let mut hz = game.tick_rate().hz();
            if rate_slider(ui, &mut hz) {
                *new_rate = Some(hz);
            }
            ui.separator();

            let settings = &game.context().settings;
            let toggles = [
                (Action::ToggleWireframe, settings.wireframe),
                (Action::ToggleBloom, settings.bloom),
                (Action::ToggleSsao, settings.ssao),
                (Action::ToggleHelpers, settings.helpers),
                (Action::ToggleMouseFollow, game.context().camera.mouse_follow()),
            ];
            for (action, on) in toggles {
                let mut checked = on;
                if ui.checkbox(&mut checked, action.label()).changed() {
                    actions.push(action);
                }
            }
            ui.horizontal(|ui| {
                for action in [Action::ReloadShaders, Action::SaveCamera, Action::Quit] {
                    if ui.button(action.label()).clicked() {
                        actions.push(action);
                    }
                }
            });

            let cam = &game.context().camera;
            ui.label(format!(
                "camera ({:.1}, {:.1}, {:.1}) yaw={:.0} pitch={:.0}",
                cam.position.x,
                cam.position.y,
                cam.position.z,
                cam.yaw.to_degrees(),
                cam.pitch.to_degrees()
            ));
            ui.separator();
            ui.small("Esc quit | F1 wire | F2 mouse | 1 bloom | 2 SSAO | F5 shaders | F6 helpers | F8 save camera | F3 panel");
        });
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.game, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.game.resize(size.width, size.height);
                gpu.sync_cursor(self.game.context().camera.mouse_follow());
                self.gpu = Some(gpu);
                if let Err(e) = self.game.start_physics() {
                    self.error = Some(e.into());
                    event_loop.exit();
                }
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.game.apply(Action::Quit);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
                self.game.resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => self.game.focus_lost(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if code == KeyCode::F3 && pressed {
                    self.show_debug = !self.show_debug;
                } else {
                    self.handle_key(code, pressed);
                }
                if self.game.should_quit() {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.game.mouse_moved(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("quarry-desktop starting");

    let config = GameConfig::load_or_default(cli.data_dir.join(&cli.config))?
        .with_data_dir(&cli.data_dir);
    let ctx = GameContext::new(config)?;
    let world = demo_world(&ctx.scene, ctx.config.demo_bodies);
    let mut game = Game::new(ctx, world)?;
    game.init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(game);
    let run = event_loop.run_app(&mut app);

    let stats = app.game.shutdown()?;
    if let Some(stats) = stats {
        tracing::info!(
            ticks = stats.ticks,
            overruns = stats.overruns,
            "physics stopped"
        );
    }
    run?;
    if let Some(e) = app.error.take() {
        return Err(e);
    }
    tracing::info!("quarry-desktop exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_slider(hz: f64) -> (f64, bool) {
        let ctx = EguiContext::default();
        let mut value = hz;
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = rate_slider(ui, &mut value);
            });
        });
        (value, changed)
    }

    #[test]
    fn rate_slider_keeps_out_of_range_rates() {
        assert_eq!(draw_slider(500.0), (500.0, false));
        assert_eq!(draw_slider(0.5), (0.5, false));
        assert_eq!(draw_slider(45.0), (45.0, false));
    }

    #[test]
    fn maps_bound_keys_only() {
        assert_eq!(map_key(KeyCode::F8), Some(Key::F8));
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }
}
