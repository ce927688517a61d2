use crate::shared::Simulation;
use glam::Vec3;
use quarry_common::{BodyId, Transform};
use std::collections::BTreeMap;

/// Below this rebound speed a body comes to rest on the ground.
const REST_SPEED: f32 = 0.05;

/// A box-shaped rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub transform: Transform,
    pub velocity: Vec3,
    /// Half the edge length of the unscaled box.
    pub half_extent: f32,
    /// Fraction of vertical speed kept after hitting the ground.
    pub restitution: f32,
    /// Static bodies are never integrated.
    pub is_static: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            velocity: Vec3::ZERO,
            half_extent: 0.5,
            restitution: 0.5,
            is_static: false,
        }
    }
}

impl Body {
    pub fn at(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Self::default()
        }
    }

    fn bottom_offset(&self) -> f32 {
        self.half_extent * self.transform.scale.y
    }
}

/// The authoritative physics state.
///
/// Bodies live in a `BTreeMap` so iteration (and therefore `state_hash`) is
/// deterministic. Build the world up front, then hand it to
/// [`SharedSimulation`](crate::SharedSimulation); from then on only
/// `advance` changes it.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: BTreeMap<BodyId, Body>,
    gravity: Vec3,
    ground_height: f32,
    tick: u64,
    sim_time: f64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground_height: 0.0,
            tick: 0,
            sim_time: 0.0,
        }
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_ground_height(mut self, height: f32) -> Self {
        self.ground_height = height;
        self
    }

    /// Completed simulation steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds, the sum of every step's `dt`.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn ground_height(&self) -> f32 {
        self.ground_height
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &BTreeMap<BodyId, Body> {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId::new();
        self.bodies.insert(id, body);
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    /// Advance every dynamic body by `dt` seconds (semi-implicit Euler).
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "ignoring non-positive physics step");
            return;
        }

        let gravity = self.gravity;
        let ground = self.ground_height;
        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            body.velocity += gravity * dt;
            body.transform.position += body.velocity * dt;

            let floor = ground + body.bottom_offset();
            if body.transform.position.y < floor {
                body.transform.position.y = floor;
                if body.velocity.y < 0.0 {
                    body.velocity.y = -body.velocity.y * body.restitution;
                    if body.velocity.y < REST_SPEED {
                        body.velocity.y = 0.0;
                    }
                }
            }
        }

        self.tick += 1;
        self.sim_time += f64::from(dt);
    }

    /// FNV-1a over tick and body state in id order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&self.tick.to_le_bytes());
        for (id, body) in &self.bodies {
            mix(id.0.as_bytes());
            let p = body.transform.position;
            let v = body.velocity;
            for f in [p.x, p.y, p.z, v.x, v.y, v.z] {
                mix(&f.to_le_bytes());
            }
        }
        h
    }
}

impl Simulation for PhysicsWorld {
    fn advance(&mut self, dt: f32) {
        self.step(dt);
    }
}
