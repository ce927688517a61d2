use crate::camera::FlyCamera;
use glam::Mat4;
use quarry_common::BodyId;
use quarry_kernel::PhysicsWorld;
use quarry_scene::SceneDescription;

/// One body as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInstance {
    pub id: BodyId,
    /// Model matrix for a unit cube.
    pub model: Mat4,
    pub is_static: bool,
}

/// Copy of the simulation state taken under the simulation lock.
///
/// Capture is the only work done while the lock is held; every pass reads
/// the snapshot afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub sim_time: f64,
    pub ground_height: f32,
    pub bodies: Vec<BodyInstance>,
}

impl FrameSnapshot {
    pub fn capture(world: &PhysicsWorld) -> Self {
        let bodies = world
            .bodies()
            .iter()
            .map(|(id, body)| {
                let t = &body.transform;
                BodyInstance {
                    id: *id,
                    model: Mat4::from_scale_rotation_translation(
                        t.scale * (2.0 * body.half_extent),
                        t.rotation,
                        t.position,
                    ),
                    is_static: body.is_static,
                }
            })
            .collect();
        Self {
            tick: world.tick(),
            sim_time: world.sim_time(),
            ground_height: world.ground_height(),
            bodies,
        }
    }
}

/// Runtime render toggles, flipped by key bindings and the debug panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub wireframe: bool,
    pub bloom: bool,
    pub ssao: bool,
    /// Debug helper geometry such as the sun gizmo.
    pub helpers: bool,
    pub(crate) reload_requests: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            wireframe: false,
            bloom: true,
            ssao: true,
            helpers: true,
            reload_requests: 0,
        }
    }
}

impl RenderSettings {
    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        self.wireframe
    }

    pub fn toggle_bloom(&mut self) -> bool {
        self.bloom = !self.bloom;
        self.bloom
    }

    pub fn toggle_ssao(&mut self) -> bool {
        self.ssao = !self.ssao;
        self.ssao
    }

    pub fn toggle_helpers(&mut self) -> bool {
        self.helpers = !self.helpers;
        self.helpers
    }

    /// Ask the backend to rebuild its shaders before the next frame.
    pub fn request_shader_reload(&mut self) {
        self.reload_requests += 1;
    }

    pub fn reload_requests(&self) -> u64 {
        self.reload_requests
    }
}

/// Everything a backend may read while drawing one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub camera: &'a FlyCamera,
    pub scene: &'a SceneDescription,
    pub snapshot: &'a FrameSnapshot,
    pub settings: &'a RenderSettings,
    /// Debug text for the 2D overlay, one entry per line.
    pub overlay: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use quarry_kernel::Body;

    #[test]
    fn capture_copies_world_state() {
        let mut world = PhysicsWorld::new().with_ground_height(2.0);
        let id = world.add_body(Body {
            half_extent: 1.5,
            ..Body::at(Vec3::new(1.0, 8.0, -3.0))
        });
        world.step(1.0 / 45.0);

        let snap = FrameSnapshot::capture(&world);
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.ground_height, 2.0);
        assert_eq!(snap.bodies.len(), 1);

        let body = &snap.bodies[0];
        assert_eq!(body.id, id);
        let (scale, _, translation) = body.model.to_scale_rotation_translation();
        assert!((scale - Vec3::splat(3.0)).length() < 1e-5);
        assert_eq!(translation, world.body(id).unwrap().transform.position);
    }

    #[test]
    fn settings_toggles() {
        let mut s = RenderSettings::default();
        assert!(!s.wireframe && s.bloom && s.ssao && s.helpers);
        assert!(s.toggle_wireframe());
        assert!(!s.toggle_bloom());
        assert!(!s.toggle_ssao());
        assert!(!s.toggle_helpers());
        assert!(s.toggle_bloom());
    }

    #[test]
    fn reload_requests_accumulate() {
        let mut s = RenderSettings::default();
        s.request_shader_reload();
        s.request_shader_reload();
        assert_eq!(s.reload_requests(), 2);
    }
}
