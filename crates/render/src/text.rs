use crate::frame::RenderFrame;
use crate::pipeline::{PassKind, RenderBackend};
use std::fmt::Write;

/// Backend that describes each pass as text.
///
/// Used by the CLI for headless runs and by tests to observe pass order.
#[derive(Debug, Default)]
pub struct TextBackend {
    passes: Vec<PassKind>,
    out: String,
    reloads: u32,
}

impl TextBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes executed since the last [`take_output`](Self::take_output).
    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Drain the accumulated text and pass log.
    pub fn take_output(&mut self) -> String {
        self.passes.clear();
        std::mem::take(&mut self.out)
    }

    fn line(&mut self, pass: PassKind, text: std::fmt::Arguments<'_>) {
        self.passes.push(pass);
        let _ = writeln!(self.out, "[{pass}] {text}");
    }
}

impl RenderBackend for TextBackend {
    fn reload_shaders(&mut self) {
        self.reloads += 1;
        self.out.push_str("[reload] shaders rebuilt\n");
    }

    fn ui_2d(&mut self, frame: &RenderFrame<'_>) {
        self.line(
            PassKind::Ui2d,
            format_args!("{} overlay lines", frame.overlay.len()),
        );
        for l in frame.overlay {
            let _ = writeln!(self.out, "    {l}");
        }
    }

    fn shadow_maps(&mut self, frame: &RenderFrame<'_>) {
        let sun = &frame.scene.sun;
        if sun.shadows {
            self.line(
                PassKind::ShadowMaps,
                format_args!(
                    "sun {}px over {}x{}",
                    sun.shadow_resolution, sun.shadow_extent.x, sun.shadow_extent.y
                ),
            );
        } else {
            self.line(PassKind::ShadowMaps, format_args!("shadows off"));
        }
    }

    fn depth_prepass(&mut self, frame: &RenderFrame<'_>) {
        self.line(
            PassKind::DepthPrepass,
            format_args!(
                "{} bodies, {}",
                frame.snapshot.bodies.len(),
                if frame.settings.wireframe { "lines" } else { "fill" }
            ),
        );
    }

    fn forward(&mut self, frame: &RenderFrame<'_>) {
        let snap = frame.snapshot;
        let cam = frame.camera.position;
        self.line(
            PassKind::Forward,
            format_args!(
                "tick={} t={:.3}s camera=({:.1}, {:.1}, {:.1}) skybox={}",
                snap.tick,
                snap.sim_time,
                cam.x,
                cam.y,
                cam.z,
                if frame.settings.wireframe { "hidden" } else { "shown" }
            ),
        );
        for body in &snap.bodies {
            let p = body.model.w_axis;
            let _ = writeln!(
                self.out,
                "    [{}] pos=({:.2}, {:.2}, {:.2}){}",
                body.id.short(),
                p.x,
                p.y,
                p.z,
                if body.is_static { " static" } else { "" }
            );
        }
    }

    fn ssao(&mut self, _frame: &RenderFrame<'_>) {
        self.line(PassKind::Ssao, format_args!("on"));
    }

    fn bloom(&mut self, _frame: &RenderFrame<'_>) {
        self.line(PassKind::Bloom, format_args!("on"));
    }

    fn composite(&mut self, frame: &RenderFrame<'_>) {
        self.line(
            PassKind::Composite,
            format_args!("helpers={}", frame.settings.helpers),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FlyCamera;
    use crate::frame::{FrameSnapshot, RenderSettings};
    use crate::pipeline::FramePipeline;
    use glam::Vec3;
    use quarry_kernel::{Body, PhysicsWorld};
    use quarry_scene::SceneDescription;

    #[test]
    fn describes_bodies_and_overlay() {
        let mut world = PhysicsWorld::new();
        world.add_body(Body::at(Vec3::new(1.0, 2.0, 3.0)));
        let snapshot = FrameSnapshot::capture(&world);
        let camera = FlyCamera::default();
        let scene = SceneDescription::default();
        let settings = RenderSettings {
            wireframe: true,
            ..RenderSettings::default()
        };
        let overlay = vec!["fps 144".to_string()];
        let frame = RenderFrame {
            camera: &camera,
            scene: &scene,
            snapshot: &snapshot,
            settings: &settings,
            overlay: &overlay,
        };

        let mut backend = TextBackend::new();
        FramePipeline::new().render(&mut backend, &frame);
        let out = backend.take_output();

        assert!(out.contains("[ui_2d] 1 overlay lines"));
        assert!(out.contains("fps 144"));
        assert!(out.contains("shadows off"));
        assert!(out.contains("pos=(1.00, 2.00, 3.00)"));
        assert!(out.contains("skybox=hidden"));
        assert!(backend.passes().is_empty());
    }
}
