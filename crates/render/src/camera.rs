use glam::{Mat4, Vec2, Vec3};
use quarry_common::CameraState;
use quarry_scene::CameraProjection;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Fly camera with position, yaw, pitch and projection parameters.
///
/// Camera motion runs on the render thread at frame rate and never touches
/// the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub speed: f32,
    pub sprint_factor: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    /// Radians per second from the look keys.
    pub look_speed: f32,
    mouse_follow: bool,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 45.0, 60.0),
            yaw: -90.0_f32.to_radians(),
            pitch: -20.0_f32.to_radians(),
            fov: 70.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1e4,
            speed: 10.0,
            sprint_factor: 4.0,
            sensitivity: 0.003,
            look_speed: 1.0,
            mouse_follow: true,
        }
    }
}

impl FlyCamera {
    pub fn with_projection(projection: &CameraProjection) -> Self {
        let mut cam = Self::default();
        cam.apply_projection(projection);
        cam
    }

    pub fn apply_projection(&mut self, projection: &CameraProjection) {
        self.fov = projection.fov_radians();
        self.near = projection.near;
        self.far = projection.far;
    }

    /// The persistable part of the camera.
    pub fn state(&self) -> CameraState {
        CameraState {
            position: self.position.to_array(),
            yaw: self.yaw,
            pitch: self.pitch,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }

    pub fn set_state(&mut self, state: &CameraState) {
        self.position = Vec3::from_array(state.position);
        self.yaw = state.yaw;
        self.pitch = state.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.fov = state.fov;
        self.near = state.near;
        self.far = state.far;
    }

    pub fn mouse_follow(&self) -> bool {
        self.mouse_follow
    }

    /// Returns the new setting.
    pub fn toggle_mouse_follow(&mut self) -> bool {
        self.mouse_follow = !self.mouse_follow;
        self.mouse_follow
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Apply one frame of held-key motion.
    ///
    /// `axes` is x right, y up, z forward. Forward and right stay in the
    /// horizontal plane regardless of pitch; up is world up.
    pub fn update(&mut self, dt: f32, axes: Vec3, look: Vec2, sprint: bool) {
        if look != Vec2::ZERO {
            self.yaw += look.x * self.look_speed * dt;
            self.pitch = (self.pitch + look.y * self.look_speed * dt).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        let front = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin());
        let right = front.cross(Vec3::Y);
        let dir = front * axes.z + Vec3::Y * axes.y + right * axes.x;
        let factor = if sprint { self.sprint_factor } else { 1.0 };
        self.position += dir * self.speed * factor * dt;
    }

    /// Mouse look. Ignored unless mouse follow is on; returns whether the
    /// camera turned.
    pub fn mouse_moved(&mut self, dx: f32, dy: f32) -> bool {
        if !self.mouse_follow {
            return false;
        }
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        true
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Reversed-Z: depth 1 at the near plane, 0 at the far plane.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.far, self.near)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert!(cam.position.y > 0.0);
        assert!(cam.mouse_follow());
        assert!(!cam.view_projection().col(0).x.is_nan());
    }

    #[test]
    fn state_round_trips_through_record() {
        let mut cam = FlyCamera::default();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        cam.yaw = 0.4;
        let state = cam.state();

        let mut other = FlyCamera::default();
        other.set_state(&state);
        assert_eq!(other.position, cam.position);
        assert_eq!(other.yaw, 0.4);
        assert_eq!(other.state(), state);
    }

    #[test]
    fn projection_from_scene() {
        let cam = FlyCamera::with_projection(&CameraProjection {
            fov_degrees: 90.0,
            near: 1.0,
            far: 50.0,
        });
        assert!((cam.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(cam.far, 50.0);
    }

    #[test]
    fn forward_motion_stays_horizontal() {
        let mut cam = FlyCamera {
            pitch: -60.0_f32.to_radians(),
            ..FlyCamera::default()
        };
        let start = cam.position;
        cam.update(1.0, Vec3::Z, Vec2::ZERO, false);
        assert_eq!(cam.position.y, start.y);
        assert!((cam.position.distance(start) - cam.speed).abs() < 1e-4);
    }

    #[test]
    fn sprint_multiplies_speed() {
        let mut walk = FlyCamera::default();
        let mut run = FlyCamera::default();
        walk.update(0.5, Vec3::X, Vec2::ZERO, false);
        run.update(0.5, Vec3::X, Vec2::ZERO, true);
        let start = FlyCamera::default().position;
        let ratio = run.position.distance(start) / walk.position.distance(start);
        assert!((ratio - walk.sprint_factor).abs() < 1e-4);
    }

    #[test]
    fn mouse_look_respects_follow_toggle() {
        let mut cam = FlyCamera::default();
        let yaw = cam.yaw;
        assert!(cam.mouse_moved(100.0, 0.0));
        assert!(cam.yaw > yaw);

        assert!(!cam.toggle_mouse_follow());
        let yaw = cam.yaw;
        assert!(!cam.mouse_moved(100.0, 0.0));
        assert_eq!(cam.yaw, yaw);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.mouse_moved(0.0, -1e6);
        assert!(cam.pitch <= PITCH_LIMIT);
        cam.update(1e3, Vec3::ZERO, Vec2::new(0.0, -1.0), false);
        assert!(cam.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn near_plane_maps_to_depth_one() {
        let cam = FlyCamera::default();
        let p = cam.position + cam.forward() * cam.near;
        let clip = cam.view_projection().project_point3(p);
        assert!((clip.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = FlyCamera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect, 2.0);
    }
}
