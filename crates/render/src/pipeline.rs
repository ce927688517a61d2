use crate::frame::RenderFrame;
use std::fmt;

/// One stage of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Ui2d,
    ShadowMaps,
    DepthPrepass,
    Forward,
    Ssao,
    Bloom,
    Composite,
}

impl PassKind {
    pub fn label(self) -> &'static str {
        match self {
            PassKind::Ui2d => "ui_2d",
            PassKind::ShadowMaps => "shadow_maps",
            PassKind::DepthPrepass => "depth_prepass",
            PassKind::Forward => "forward",
            PassKind::Ssao => "ssao",
            PassKind::Bloom => "bloom",
            PassKind::Composite => "composite",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A renderer that can execute each stage of the frame.
///
/// [`FramePipeline`] decides which stages run and in what order; a backend
/// only implements them. Backends never mutate simulation state.
pub trait RenderBackend {
    /// Rebuild shader programs. Called before the frame's first pass.
    fn reload_shaders(&mut self) {}

    /// Draw the 2D overlay into its own target for later composition.
    fn ui_2d(&mut self, frame: &RenderFrame<'_>);

    fn shadow_maps(&mut self, frame: &RenderFrame<'_>);

    /// Depth-only pass. Depth is cleared to 0 and tested with `Greater`.
    fn depth_prepass(&mut self, frame: &RenderFrame<'_>);

    /// Shading pass over the pre-pass depth, tested with `Equal`.
    fn forward(&mut self, frame: &RenderFrame<'_>);

    fn ssao(&mut self, frame: &RenderFrame<'_>);

    fn bloom(&mut self, frame: &RenderFrame<'_>);

    /// Combine the 3D result with the 2D overlay on screen.
    fn composite(&mut self, frame: &RenderFrame<'_>);
}

/// Drives a [`RenderBackend`] through the fixed pass order.
#[derive(Debug, Default)]
pub struct FramePipeline {
    frames: u64,
    applied_reloads: u64,
}

impl FramePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render one frame and return the passes that ran, in order.
    pub fn render<B>(&mut self, backend: &mut B, frame: &RenderFrame<'_>) -> Vec<PassKind>
    where
        B: RenderBackend + ?Sized,
    {
        let requested = frame.settings.reload_requests();
        if requested != self.applied_reloads {
            tracing::info!(requested, "reloading shaders");
            backend.reload_shaders();
            self.applied_reloads = requested;
        }

        let mut passes = Vec::with_capacity(7);
        backend.ui_2d(frame);
        passes.push(PassKind::Ui2d);
        backend.shadow_maps(frame);
        passes.push(PassKind::ShadowMaps);
        backend.depth_prepass(frame);
        passes.push(PassKind::DepthPrepass);
        backend.forward(frame);
        passes.push(PassKind::Forward);
        if frame.settings.ssao {
            backend.ssao(frame);
            passes.push(PassKind::Ssao);
        }
        if frame.settings.bloom {
            backend.bloom(frame);
            passes.push(PassKind::Bloom);
        }
        backend.composite(frame);
        passes.push(PassKind::Composite);

        self.frames += 1;
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FlyCamera;
    use crate::frame::{FrameSnapshot, RenderSettings};
    use crate::text::TextBackend;
    use quarry_scene::SceneDescription;

    fn render_with(settings: &RenderSettings, pipeline: &mut FramePipeline) -> TextBackend {
        let camera = FlyCamera::default();
        let scene = SceneDescription::default();
        let snapshot = FrameSnapshot::default();
        let frame = RenderFrame {
            camera: &camera,
            scene: &scene,
            snapshot: &snapshot,
            settings,
            overlay: &[],
        };
        let mut backend = TextBackend::new();
        let passes = pipeline.render(&mut backend, &frame);
        assert_eq!(passes, backend.passes());
        backend
    }

    #[test]
    fn full_order_with_all_effects() {
        let backend = render_with(&RenderSettings::default(), &mut FramePipeline::new());
        assert_eq!(
            backend.passes(),
            [
                PassKind::Ui2d,
                PassKind::ShadowMaps,
                PassKind::DepthPrepass,
                PassKind::Forward,
                PassKind::Ssao,
                PassKind::Bloom,
                PassKind::Composite,
            ]
        );
    }

    #[test]
    fn disabled_effects_are_skipped() {
        let mut settings = RenderSettings::default();
        settings.toggle_ssao();
        let backend = render_with(&settings, &mut FramePipeline::new());
        assert!(!backend.passes().contains(&PassKind::Ssao));
        assert!(backend.passes().contains(&PassKind::Bloom));

        settings.toggle_bloom();
        let backend = render_with(&settings, &mut FramePipeline::new());
        assert_eq!(
            backend.passes(),
            [
                PassKind::Ui2d,
                PassKind::ShadowMaps,
                PassKind::DepthPrepass,
                PassKind::Forward,
                PassKind::Composite,
            ]
        );
    }

    #[test]
    fn shader_reload_runs_once_per_request() {
        let mut pipeline = FramePipeline::new();
        let mut settings = RenderSettings::default();
        assert_eq!(render_with(&settings, &mut pipeline).reloads(), 0);

        settings.request_shader_reload();
        assert_eq!(render_with(&settings, &mut pipeline).reloads(), 1);
        assert_eq!(render_with(&settings, &mut pipeline).reloads(), 0);
        assert_eq!(pipeline.frames(), 3);
    }

    #[test]
    fn pass_labels() {
        assert_eq!(PassKind::DepthPrepass.to_string(), "depth_prepass");
    }
}
